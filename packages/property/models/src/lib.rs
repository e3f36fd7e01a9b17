#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property record and area boundary types.
//!
//! These are the typed records the rest of the estate-map system works on.
//! They are produced once per dataset load by the ingestion step and are
//! never mutated afterwards; a reload replaces the whole set.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Calendar year of a price column (e.g. `2015`).
pub type Year = u16;

/// Inclusive range of tracked year columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearRange {
    /// First tracked year.
    pub first: Year,
    /// Last tracked year (inclusive).
    pub last: Year,
}

impl YearRange {
    /// Creates a new range covering `first..=last`.
    #[must_use]
    pub const fn new(first: Year, last: Year) -> Self {
        Self { first, last }
    }

    /// Iterates the years of the range in ascending order.
    #[must_use]
    pub const fn years(&self) -> RangeInclusive<Year> {
        self.first..=self.last
    }

    /// Whether `year` lies inside the range.
    #[must_use]
    pub const fn contains(&self, year: Year) -> bool {
        year >= self.first && year <= self.last
    }

    /// Whether the range contains no years (`first > last`).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first > self.last
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(2015, 2026)
    }
}

/// One real-estate unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    /// Display name. Used as the selection identity, but not guaranteed
    /// to be unique within a dataset.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Price for the reference year.
    pub price: f64,
    /// Number of bedrooms.
    pub bedrooms: u32,
    /// Number of bathrooms.
    pub bathrooms: u32,
    /// Floor area.
    pub size_units: f64,
    /// Free-form property type (e.g. "Villa", "Luxury Apartment").
    #[serde(rename = "type")]
    pub property_type: String,
    /// Street address.
    pub address: String,
    /// Sparse yearly price history, keyed by year.
    pub yearly_prices: BTreeMap<Year, f64>,
}

impl PropertyRecord {
    /// Returns the recorded price for `year`, if the row had one.
    #[must_use]
    pub fn price_in(&self, year: Year) -> Option<f64> {
        self.yearly_prices.get(&year).copied()
    }

    /// Price divided by floor area.
    ///
    /// Returns `None` when the size is zero, negative or not finite.
    #[must_use]
    pub fn price_per_unit(&self) -> Option<f64> {
        (self.size_units.is_finite() && self.size_units > 0.0)
            .then(|| self.price / self.size_units)
    }

    /// Whether two records share the same identity key.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// An administrative area polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFeature {
    /// Area name, unique within a boundary dataset.
    pub name: String,
    /// Polygon rings in `(longitude, latitude)` order. A single polygon is
    /// stored as a one-element multi-polygon.
    pub geometry: MultiPolygon<f64>,
}
