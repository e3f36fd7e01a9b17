#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area statistics and price trend aggregation over property sets.
//!
//! Every function here is pure: it reads a set of property records and
//! returns freshly computed figures, so results are always consistent with
//! the snapshot they were computed from.

use estate_map_analytics_models::{AreaStatistics, GrowthWindow, StatisticsConfig, TrendPoint};
use estate_map_property_models::{PropertyRecord, YearRange};

/// Running arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    const fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Computes summary figures for the properties inside an area.
///
/// Returns `None` for an empty set.
#[must_use]
pub fn area_statistics(
    properties: &[&PropertyRecord],
    config: &StatisticsConfig,
) -> Option<AreaStatistics> {
    if properties.is_empty() {
        return None;
    }

    let mut price = Mean::default();
    let mut per_unit = Mean::default();
    let mut growth = Mean::default();

    for property in properties {
        price.push(property.price);
        if let Some(value) = property.price_per_unit() {
            per_unit.push(value);
        }
        if let Some(value) = growth_percent(property, config.growth) {
            growth.push(value);
        }
    }

    let stats = AreaStatistics {
        property_count: properties.len(),
        avg_price: price.value()?,
        avg_price_per_unit: per_unit.value(),
        growth_percent: growth.value(),
        trend: average_trend(properties, config.years),
    };

    log::debug!(
        "Computed statistics over {} properties ({} trend points)",
        stats.property_count,
        stats.trend.len()
    );

    Some(stats)
}

/// Percentage change of one property's price across the growth window.
///
/// Returns `None` if either year is missing or the start price is zero.
#[must_use]
pub fn growth_percent(property: &PropertyRecord, window: GrowthWindow) -> Option<f64> {
    let start = property.price_in(window.start_year)?;
    let end = property.price_in(window.end_year)?;
    if start == 0.0 {
        return None;
    }
    Some((end - start) / start * 100.0)
}

/// Average price per year across `properties`, omitting years no property
/// has a price for.
#[must_use]
pub fn average_trend(properties: &[&PropertyRecord], years: YearRange) -> Vec<TrendPoint> {
    years
        .years()
        .filter_map(|year| {
            let mut mean = Mean::default();
            for price in properties.iter().filter_map(|p| p.price_in(year)) {
                mean.push(price);
            }
            mean.value().map(|price| TrendPoint { year, price })
        })
        .collect()
}

/// Yearly price history of a single property within `years`, ascending,
/// omitting years without data.
#[must_use]
pub fn property_trend(property: &PropertyRecord, years: YearRange) -> Vec<TrendPoint> {
    years
        .years()
        .filter_map(|year| property.price_in(year).map(|price| TrendPoint { year, price }))
        .collect()
}
