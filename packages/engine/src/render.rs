//! What the presentation layer draws, derived from the current state.

use estate_map_analytics_models::TrendPoint;
use estate_map_property_models::PropertyRecord;
use estate_map_style::{AreaStyle, MarkerStyle};
use geo::MultiPolygon;
use serde::Serialize;

/// One property marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker<'a> {
    /// Property name.
    pub name: &'a str,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Radius in `[2, 22]`, log-scaled by price.
    pub radius: f64,
    /// Fill color by property type.
    pub color: &'static str,
    /// Whether this is the focused property.
    pub selected: bool,
    /// Stroke and opacity.
    pub style: MarkerStyle,
}

/// One area polygon layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaLayer<'a> {
    /// Area name.
    pub name: &'a str,
    /// Boundary rings.
    pub geometry: &'a MultiPolygon<f64>,
    /// Whether this is the focused area.
    pub selected: bool,
    /// Stroke and fill.
    pub style: AreaStyle,
}

/// Detail panel content for the focused property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail<'a> {
    /// The focused record.
    pub property: &'a PropertyRecord,
    /// Type color, shared with the marker.
    pub color: &'static str,
    /// Price per floor area unit, `None` without a positive size.
    pub price_per_unit: Option<f64>,
    /// Yearly price history.
    pub trend: Vec<TrendPoint>,
    /// Whether the history includes years after the reference year.
    pub has_forecast: bool,
}
