#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion configuration, warning, and summary types.

use estate_map_property_models::{Year, YearRange};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Column holding the property name.
pub const NAME_COLUMN: &str = "name";
/// Column holding the latitude.
pub const LATITUDE_COLUMN: &str = "latitude";
/// Column holding the longitude.
pub const LONGITUDE_COLUMN: &str = "longitude";
/// Column holding the bedroom count.
pub const BEDROOMS_COLUMN: &str = "no_bedrooms";
/// Column holding the bathroom count.
pub const BATHROOMS_COLUMN: &str = "no_bathrooms";
/// Column holding the floor area.
pub const SIZE_COLUMN: &str = "area";
/// Column holding the free-form property type.
pub const TYPE_COLUMN: &str = "type";
/// Column holding the street address.
pub const ADDRESS_COLUMN: &str = "address";
/// Feature property holding the area name.
pub const AREA_NAME_PROPERTY: &str = "name";

/// Controls how raw rows are turned into property records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestConfig {
    /// Year column whose value becomes the record's `price`.
    pub reference_year: Year,
    /// Candidate year columns scanned for the price history.
    pub years: YearRange,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            reference_year: 2025,
            years: YearRange::default(),
        }
    }
}

/// Why a row was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RowDropReason {
    /// Latitude column missing or not a finite number.
    InvalidLatitude,
    /// Longitude column missing or not a finite number.
    InvalidLongitude,
    /// Reference year column missing or not a finite number.
    InvalidReferencePrice,
}

/// Why a boundary feature was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureSkipReason {
    /// No non-empty `name` property.
    MissingName,
    /// Feature has no geometry.
    MissingGeometry,
    /// Geometry is not a polygon or multi-polygon.
    UnsupportedGeometry,
    /// Geometry cannot be decoded, has no rings, has a degenerate ring, or
    /// has non-finite coordinates.
    MalformedGeometry,
    /// An earlier feature already used this name.
    DuplicateName,
}

/// A non-fatal problem encountered while ingesting a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestWarning {
    /// A property row was dropped.
    RowDropped {
        /// 1-based data row number (the header is not counted).
        row: usize,
        /// Why the row was dropped.
        reason: RowDropReason,
    },
    /// A property row was admitted but shares its name with an earlier row.
    DuplicatePropertyName {
        /// 1-based data row number.
        row: usize,
        /// The colliding name.
        name: String,
    },
    /// A boundary feature was skipped.
    FeatureSkipped {
        /// 0-based position in the feature collection.
        index: usize,
        /// Feature name, when one could be read.
        name: Option<String>,
        /// Why the feature was skipped.
        reason: FeatureSkipReason,
    },
}

impl std::fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowDropped { row, reason } => write!(f, "row {row} dropped: {reason}"),
            Self::DuplicatePropertyName { row, name } => {
                write!(f, "row {row} reuses property name '{name}'")
            }
            Self::FeatureSkipped {
                index,
                name: Some(name),
                reason,
            } => write!(f, "feature {index} ('{name}') skipped: {reason}"),
            Self::FeatureSkipped {
                index,
                name: None,
                reason,
            } => write!(f, "feature {index} skipped: {reason}"),
        }
    }
}

/// Outcome of ingesting one dataset (property rows or boundary features).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Number of records that entered the model.
    pub admitted: usize,
    /// Number of input records that were dropped.
    pub dropped: usize,
    /// Every non-fatal problem, in input order.
    pub warnings: Vec<IngestWarning>,
}

impl IngestSummary {
    /// Total number of input records seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.admitted + self.dropped
    }

    /// Records a dropped row.
    pub fn drop_row(&mut self, row: usize, reason: RowDropReason) {
        self.dropped += 1;
        self.warnings.push(IngestWarning::RowDropped { row, reason });
    }

    /// Records a skipped feature.
    pub fn skip_feature(&mut self, index: usize, name: Option<String>, reason: FeatureSkipReason) {
        self.dropped += 1;
        self.warnings.push(IngestWarning::FeatureSkipped {
            index,
            name,
            reason,
        });
    }
}
