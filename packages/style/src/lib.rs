#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Marker size and color encodings and map layer styles.
//!
//! Pure functions deciding how a property marker or an area polygon should
//! look. Nothing here draws; the presentation layer applies the values.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Smallest marker radius.
pub const MIN_RADIUS: f64 = 2.0;
/// Largest marker radius.
pub const MAX_RADIUS: f64 = 22.0;
/// Radius used when every property has the same price.
pub const MID_RADIUS: f64 = (MIN_RADIUS + MAX_RADIUS) / 2.0;

/// Lowest and highest reference price in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    /// Lowest price.
    pub min: f64,
    /// Highest price.
    pub max: f64,
}

impl PriceRange {
    /// Computes the range over `prices`, ignoring non-finite values.
    ///
    /// Returns `None` when there is no finite price.
    #[must_use]
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        prices
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |range, price| {
                Some(match range {
                    None => Self {
                        min: price,
                        max: price,
                    },
                    Some(Self { min, max }) => Self {
                        min: min.min(price),
                        max: max.max(price),
                    },
                })
            })
    }

    /// Marker radius for `price` within this range.
    #[must_use]
    pub fn radius(&self, price: f64) -> f64 {
        marker_radius(price, self.min, self.max)
    }
}

/// Log-scaled marker radius in `[2, 22]`.
///
/// `ln(price + 1)` is interpolated linearly between `ln(min + 1)` and
/// `ln(max + 1)` and mapped onto the radius range. Negative prices are
/// treated as zero and the result is clamped, so prices outside the range
/// still produce a radius in `[2, 22]`. A degenerate range (`min == max`)
/// yields [`MID_RADIUS`].
#[must_use]
pub fn marker_radius(price: f64, dataset_min: f64, dataset_max: f64) -> f64 {
    let log_min = scaled(dataset_min);
    let span = scaled(dataset_max) - log_min;

    if !(span > 0.0 && span.is_finite()) {
        return MID_RADIUS;
    }

    let normalized = ((scaled(price) - log_min) / span).clamp(0.0, 1.0);
    if normalized.is_nan() {
        return MIN_RADIUS;
    }

    normalized.mul_add(MAX_RADIUS - MIN_RADIUS, MIN_RADIUS)
}

fn scaled(price: f64) -> f64 {
    price.max(0.0).ln_1p()
}

/// Color categories derived from the free-form property type.
///
/// Ordered by matching priority.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeCategory {
    /// Type mentions "villa".
    Villa,
    /// Type mentions "apartment".
    Apartment,
    /// Type mentions "townhouse".
    Townhouse,
    /// Type mentions "penthouse".
    Penthouse,
    /// None of the above.
    Other,
}

impl TypeCategory {
    /// Matchable categories in priority order.
    #[must_use]
    pub const fn ranked() -> &'static [Self] {
        &[Self::Villa, Self::Apartment, Self::Townhouse, Self::Penthouse]
    }

    /// Lower-case keyword searched for in the property type.
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Villa => Some("villa"),
            Self::Apartment => Some("apartment"),
            Self::Townhouse => Some("townhouse"),
            Self::Penthouse => Some("penthouse"),
            Self::Other => None,
        }
    }

    /// Hex fill color for markers of this category.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Villa => "#FF3C3C",
            Self::Apartment => "#FFBD43",
            Self::Townhouse => "#59DE8C",
            Self::Penthouse => "#A593E0",
            Self::Other => DEFAULT_COLOR,
        }
    }

    /// Classifies a free-form property type by case-insensitive substring
    /// match. The first matching category wins.
    #[must_use]
    pub fn classify(property_type: &str) -> Self {
        let normalized = property_type.to_lowercase();
        Self::ranked()
            .iter()
            .copied()
            .find(|category| {
                category
                    .keyword()
                    .is_some_and(|keyword| normalized.contains(keyword))
            })
            .unwrap_or(Self::Other)
    }
}

/// Neutral fill for types outside the known vocabulary.
pub const DEFAULT_COLOR: &str = "#888";

/// Hex fill color for a free-form property type.
#[must_use]
pub fn color_for_type(property_type: &str) -> &'static str {
    TypeCategory::classify(property_type).color()
}

/// Stroke and fill settings for a property marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Outline color.
    pub stroke: &'static str,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
}

impl MarkerStyle {
    /// Style for a marker, highlighted when it is the focused property.
    #[must_use]
    pub const fn for_selection(selected: bool) -> Self {
        Self {
            stroke: if selected { "#000" } else { "#333" },
            fill_opacity: 0.8,
        }
    }
}

/// Stroke and fill settings for an area polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStyle {
    /// Outline width.
    pub weight: f64,
    /// Outline color.
    pub color: &'static str,
    /// Fill color.
    pub fill_color: &'static str,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
}

impl AreaStyle {
    /// Style of an area that is not selected.
    pub const DEFAULT: Self = Self {
        weight: 2.0,
        color: "#3388ff",
        fill_color: "#3388ff",
        fill_opacity: 0.2,
    };

    /// Style of the focused area.
    pub const SELECTED: Self = Self {
        weight: 4.0,
        color: "#ff0000",
        fill_color: "#ff7800",
        fill_opacity: 0.7,
    };

    /// Picks the style for an area.
    #[must_use]
    pub const fn for_selection(selected: bool) -> Self {
        if selected { Self::SELECTED } else { Self::DEFAULT }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn radius_stays_in_bounds_and_is_monotonic() {
        let (min, max) = (250_000.0, 45_000_000.0);
        let mut previous = 0.0;
        for step in 0..=100_i32 {
            let price = min + (max - min) * f64::from(step) / 100.0;
            let r = marker_radius(price, min, max);
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&r), "radius {r} at {price}");
            assert!(r >= previous, "radius decreased at {price}");
            previous = r;
        }
        assert!((marker_radius(min, min, max) - MIN_RADIUS).abs() < 1e-9);
        assert!((marker_radius(max, min, max) - MAX_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn degenerate_range_uses_midpoint() {
        assert!((MID_RADIUS - 12.0).abs() < f64::EPSILON);
        for price in [0.0, 750_000.0, 10_000_000.0] {
            assert!((marker_radius(price, 750_000.0, 750_000.0) - 12.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn out_of_range_prices_are_clamped() {
        assert!((marker_radius(1.0, 1_000.0, 2_000.0) - MIN_RADIUS).abs() < f64::EPSILON);
        assert!((marker_radius(1e12, 1_000.0, 2_000.0) - MAX_RADIUS).abs() < f64::EPSILON);
        assert!((marker_radius(-5.0, 0.0, 2_000.0) - MIN_RADIUS).abs() < f64::EPSILON);
    }

    #[test]
    fn cheaper_property_gets_smaller_marker() {
        let range = PriceRange::from_prices([500_000.0, 1_000_000.0]).unwrap();
        assert!(range.radius(500_000.0) < range.radius(1_000_000.0));
    }

    #[test]
    fn price_range_skips_non_finite_and_handles_empty() {
        let range = PriceRange::from_prices([3.0, f64::NAN, 1.0, f64::INFINITY, 2.0]).unwrap();
        assert!((range.min - 1.0).abs() < f64::EPSILON);
        assert!((range.max - 3.0).abs() < f64::EPSILON);
        assert!(PriceRange::from_prices(std::iter::empty()).is_none());
    }

    #[test]
    fn classifies_by_case_insensitive_substring() {
        assert_eq!(color_for_type("Modern Villa"), "#FF3C3C");
        assert_eq!(TypeCategory::classify("LUXURY APARTMENT"), TypeCategory::Apartment);
        assert_eq!(TypeCategory::classify("townhouse"), TypeCategory::Townhouse);
        assert_eq!(TypeCategory::classify("Sky Penthouse"), TypeCategory::Penthouse);
    }

    #[test]
    fn first_category_in_priority_order_wins() {
        assert_eq!(TypeCategory::classify("Penthouse Villa"), TypeCategory::Villa);
        assert_eq!(
            TypeCategory::classify("Apartment / Townhouse"),
            TypeCategory::Apartment
        );
    }

    #[test]
    fn unknown_types_fall_back_to_neutral_color() {
        assert_eq!(TypeCategory::classify("Office"), TypeCategory::Other);
        assert_eq!(TypeCategory::classify(""), TypeCategory::Other);
        assert_eq!(color_for_type("Warehouse"), DEFAULT_COLOR);
    }

    #[test]
    fn category_names_round_trip_through_strum() {
        for category in TypeCategory::ranked() {
            let parsed = TypeCategory::from_str(category.as_ref()).unwrap();
            assert_eq!(parsed, *category);
        }
    }

    #[test]
    fn selection_styles() {
        assert_eq!(MarkerStyle::for_selection(true).stroke, "#000");
        assert_eq!(MarkerStyle::for_selection(false).stroke, "#333");
        assert_eq!(AreaStyle::for_selection(true), AreaStyle::SELECTED);
        assert_eq!(AreaStyle::for_selection(false), AreaStyle::DEFAULT);
    }
}
