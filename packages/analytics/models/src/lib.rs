#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area statistics and price trend types.
//!
//! These are derived values: they are recomputed from the current property
//! snapshot on every query and never cached across dataset reloads.

use estate_map_property_models::{Year, YearRange};
use serde::{Deserialize, Serialize};

/// A single point of a yearly price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Calendar year, written as a string (`"2015"`) to match the CSV
    /// column header it came from.
    #[serde(with = "year_string")]
    pub year: Year,
    /// Price for a single property, or the average over an area.
    pub price: f64,
}

mod year_string {
    use estate_map_property_models::Year;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(year: &Year, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(year)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Year, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.trim().parse().map_err(D::Error::custom)
    }
}

/// Summary figures for the properties inside an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStatistics {
    /// Number of properties in the area.
    pub property_count: usize,
    /// Mean reference-year price.
    pub avg_price: f64,
    /// Mean of price divided by floor area, over properties with a
    /// positive floor area. `None` when no property has one.
    pub avg_price_per_unit: Option<f64>,
    /// Mean percentage growth between the growth window's start and end
    /// years, over properties having both. `None` when none qualify.
    pub growth_percent: Option<f64>,
    /// Average price per year, ascending, omitting years without data.
    pub trend: Vec<TrendPoint>,
}

/// Years compared when computing growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthWindow {
    /// Baseline year.
    pub start_year: Year,
    /// Comparison year.
    pub end_year: Year,
}

impl Default for GrowthWindow {
    fn default() -> Self {
        Self {
            start_year: 2015,
            end_year: 2025,
        }
    }
}

/// Controls which years statistics are computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Years included in trend series.
    pub years: YearRange,
    /// Years compared for growth.
    pub growth: GrowthWindow,
}
