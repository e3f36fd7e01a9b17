#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The estate-map engine.
//!
//! [`Engine`] owns the current property and boundary snapshots and the
//! selection state. The presentation layer drives it with interaction
//! events and reads render data back:
//!
//! 1. start a load ([`Engine::begin_property_load`]), parse the input off
//!    the event loop, then hand the rows back with
//!    [`Engine::complete_property_load`]. The snapshot is replaced in one
//!    step; results of loads overtaken by a newer completed load are
//!    discarded.
//! 2. forward clicks as [`Engine::select_marker`], [`Engine::select_area`],
//!    [`Engine::switch_mode`], [`Engine::dismiss`] and
//!    [`Engine::close_panel`].
//! 3. draw [`Engine::markers`], [`Engine::area_layers`] and the detail
//!    panel from [`Engine::selection`] / [`Engine::property_detail`].
//!
//! Statistics and trends are recomputed from the current snapshot on
//! every call.

pub mod config;
pub mod load;
pub mod render;

use std::collections::BTreeMap;
use std::ops::Bound;

use estate_map_analytics::{area_statistics, property_trend};
use estate_map_analytics_models::{AreaStatistics, TrendPoint};
use estate_map_ingest::{RawRow, admit_features, admit_rows};
use estate_map_ingest_models::IngestSummary;
use estate_map_property_models::{AreaFeature, PropertyRecord};
use estate_map_selection::{AreaFocus, Mode, SelectionEvent, SelectionState, Transition};
use estate_map_spatial::{GeometryError, PropertyIndex};
use estate_map_style::{AreaStyle, MID_RADIUS, MarkerStyle, PriceRange, color_for_type};

pub use config::{ConfigError, EngineConfig, MapView};
pub use load::{LoadError, LoadKind, LoadSequencer, LoadTicket};
pub use render::{AreaLayer, Marker, PropertyDetail};

/// Result of forwarding a selection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Something is focused and the detail panel is open.
    Focused,
    /// Focus was cleared and the panel closed.
    Cleared,
    /// The event does not apply in the current mode.
    Ignored,
    /// No property has the requested name.
    UnknownProperty,
    /// No area has the requested name.
    UnknownArea,
    /// The area is focused, but its geometry could not be tested so it
    /// shows no statistics.
    Degraded {
        /// Why membership could not be computed.
        error: GeometryError,
    },
}

impl From<Transition> for SelectOutcome {
    fn from(value: Transition) -> Self {
        match value {
            Transition::Focused => Self::Focused,
            Transition::Cleared => Self::Cleared,
            Transition::Ignored => Self::Ignored,
        }
    }
}

/// Why on-demand area statistics are unavailable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatisticsError {
    /// No area has the requested name.
    #[error("Unknown area '{0}'")]
    UnknownArea(String),

    /// The area's geometry cannot be tested.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// One property snapshot with its derived lookup structures.
#[derive(Debug)]
struct PropertySet {
    records: Vec<PropertyRecord>,
    index: PropertyIndex,
    price_range: Option<PriceRange>,
    by_name: BTreeMap<String, usize>,
}

impl PropertySet {
    fn new(records: Vec<PropertyRecord>) -> Self {
        let mut by_name = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            by_name.entry(record.name.clone()).or_insert(i);
        }

        Self {
            index: PropertyIndex::build(&records),
            price_range: PriceRange::from_prices(records.iter().map(|p| p.price)),
            by_name,
            records,
        }
    }

    fn get(&self, name: &str) -> Option<&PropertyRecord> {
        self.by_name.get(name).and_then(|&i| self.records.get(i))
    }

    fn in_area(&self, area: &AreaFeature) -> Result<Vec<&PropertyRecord>, GeometryError> {
        self.index.properties_in_area(area, &self.records)
    }
}

/// One boundary snapshot.
#[derive(Debug, Default)]
struct AreaSet {
    features: Vec<AreaFeature>,
    by_name: BTreeMap<String, usize>,
}

impl AreaSet {
    fn new(features: Vec<AreaFeature>) -> Self {
        let by_name = features
            .iter()
            .enumerate()
            .map(|(i, area)| (area.name.clone(), i))
            .collect();
        Self { features, by_name }
    }

    fn get(&self, name: &str) -> Option<&AreaFeature> {
        self.by_name.get(name).and_then(|&i| self.features.get(i))
    }
}

/// Geo-analytics and selection engine for one map session.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    properties: PropertySet,
    areas: AreaSet,
    selection: SelectionState,
    property_loads: LoadSequencer,
    boundary_loads: LoadSequencer,
    property_summary: Option<IngestSummary>,
    boundary_summary: Option<IngestSummary>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an empty engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the year settings are inconsistent.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            properties: PropertySet::new(Vec::new()),
            areas: AreaSet::default(),
            selection: SelectionState::new(),
            property_loads: LoadSequencer::new(LoadKind::Properties),
            boundary_loads: LoadSequencer::new(LoadKind::Boundaries),
            property_summary: None,
            boundary_summary: None,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Initial map viewport.
    #[must_use]
    pub const fn map_view(&self) -> MapView {
        self.config.map
    }

    // Loading

    /// Starts a property load.
    pub const fn begin_property_load(&mut self) -> LoadTicket {
        self.property_loads.begin()
    }

    /// Replaces the property snapshot with the admitted `rows`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] and leaves the snapshot untouched if a
    /// newer property load was already applied.
    pub fn complete_property_load(
        &mut self,
        ticket: LoadTicket,
        rows: &[RawRow],
    ) -> Result<IngestSummary, LoadError> {
        if let Err(e) = self.property_loads.accept(ticket) {
            log::warn!("{e}");
            return Err(e);
        }

        let (records, summary) = admit_rows(rows, &self.config.ingest());
        self.properties = PropertySet::new(records);
        self.property_summary = Some(summary.clone());

        log::info!(
            "Property load {} applied: {} properties",
            ticket.generation(),
            self.properties.records.len()
        );

        Ok(summary)
    }

    /// Starts and completes a property load in one step.
    pub fn load_properties(&mut self, rows: &[RawRow]) -> IngestSummary {
        let ticket = self.begin_property_load();
        self.complete_property_load(ticket, rows)
            .unwrap_or_default()
    }

    /// Starts a boundary load.
    pub const fn begin_boundary_load(&mut self) -> LoadTicket {
        self.boundary_loads.begin()
    }

    /// Replaces the boundary snapshot with the admitted `features`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] and leaves the snapshot untouched if a
    /// newer boundary load was already applied.
    pub fn complete_boundary_load(
        &mut self,
        ticket: LoadTicket,
        features: Vec<serde_json::Value>,
    ) -> Result<IngestSummary, LoadError> {
        if let Err(e) = self.boundary_loads.accept(ticket) {
            log::warn!("{e}");
            return Err(e);
        }

        let (areas, summary) = admit_features(features);
        for warning in &summary.warnings {
            log::warn!("Boundary {warning}");
        }
        self.areas = AreaSet::new(areas);
        self.boundary_summary = Some(summary.clone());

        log::info!(
            "Boundary load {} applied: {} areas",
            ticket.generation(),
            self.areas.features.len()
        );

        Ok(summary)
    }

    /// Starts and completes a boundary load in one step.
    pub fn load_boundaries(&mut self, features: Vec<serde_json::Value>) -> IngestSummary {
        let ticket = self.begin_boundary_load();
        self.complete_boundary_load(ticket, features)
            .unwrap_or_default()
    }

    /// Summary of the last applied property load.
    #[must_use]
    pub const fn property_summary(&self) -> Option<&IngestSummary> {
        self.property_summary.as_ref()
    }

    /// Summary of the last applied boundary load.
    #[must_use]
    pub const fn boundary_summary(&self) -> Option<&IngestSummary> {
        self.boundary_summary.as_ref()
    }

    // Model access

    /// Every admitted property, in input order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyRecord] {
        &self.properties.records
    }

    /// Every admitted area, in input order.
    #[must_use]
    pub fn areas(&self) -> &[AreaFeature] {
        &self.areas.features
    }

    /// Price range of the property snapshot; `None` when it is empty.
    #[must_use]
    pub const fn price_range(&self) -> Option<PriceRange> {
        self.properties.price_range
    }

    /// First property with `name`.
    #[must_use]
    pub fn property_by_name(&self, name: &str) -> Option<&PropertyRecord> {
        self.properties.get(name)
    }

    /// The area named `name`.
    #[must_use]
    pub fn area_by_name(&self, name: &str) -> Option<&AreaFeature> {
        self.areas.get(name)
    }

    /// Properties inside the named area, without touching selection.
    ///
    /// # Errors
    ///
    /// Returns a [`StatisticsError`] if the area is unknown or its geometry
    /// cannot be tested.
    pub fn properties_in_area(&self, name: &str) -> Result<Vec<&PropertyRecord>, StatisticsError> {
        let area = self
            .areas
            .get(name)
            .ok_or_else(|| StatisticsError::UnknownArea(name.to_string()))?;
        Ok(self.properties.in_area(area)?)
    }

    /// Statistics for the named area, without touching selection.
    /// `Ok(None)` means the area holds no properties.
    ///
    /// # Errors
    ///
    /// Returns a [`StatisticsError`] if the area is unknown or its geometry
    /// cannot be tested.
    pub fn area_statistics_for(&self, name: &str) -> Result<Option<AreaStatistics>, StatisticsError> {
        let members = self.properties_in_area(name)?;
        Ok(area_statistics(&members, &self.config.statistics()))
    }

    /// Yearly price history of the first property with `name`.
    #[must_use]
    pub fn property_trend_for(&self, name: &str) -> Option<Vec<TrendPoint>> {
        self.properties
            .get(name)
            .map(|p| property_trend(p, self.config.years))
    }

    // Selection

    /// Current selection state.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.selection.mode()
    }

    /// A property marker was clicked.
    pub fn select_marker(&mut self, property: PropertyRecord) -> SelectOutcome {
        self.selection
            .apply(SelectionEvent::SelectMarker(property))
            .into()
    }

    /// Selects the first property named `name` as if its marker had been
    /// clicked.
    pub fn select_marker_by_name(&mut self, name: &str) -> SelectOutcome {
        match self.properties.get(name) {
            Some(property) => {
                let property = property.clone();
                self.select_marker(property)
            }
            None => SelectOutcome::UnknownProperty,
        }
    }

    /// An area polygon was clicked. Computes the area's statistics against
    /// the current snapshot and focuses it.
    pub fn select_area(&mut self, name: &str) -> SelectOutcome {
        if self.selection.mode() != Mode::Area {
            log::debug!("Ignoring area '{name}' in {} mode", self.selection.mode());
            return SelectOutcome::Ignored;
        }

        let Some(area) = self.areas.get(name) else {
            log::debug!("Unknown area '{name}'");
            return SelectOutcome::UnknownArea;
        };

        let (statistics, degraded) = match self.properties.in_area(area) {
            Ok(members) => (area_statistics(&members, &self.config.statistics()), None),
            Err(e) => {
                log::warn!("Area '{name}' has unusable geometry: {e}");
                (None, Some(e))
            }
        };

        let focus = AreaFocus {
            area: area.clone(),
            statistics,
        };
        let transition = self.selection.apply(SelectionEvent::SelectArea(focus));

        match degraded {
            Some(error) => SelectOutcome::Degraded { error },
            None => transition.into(),
        }
    }

    /// Switches mode, clearing any focus.
    pub fn switch_mode(&mut self, mode: Mode) -> SelectOutcome {
        self.selection.apply(SelectionEvent::SwitchMode(mode)).into()
    }

    /// A click landed on the map outside the detail panel.
    pub fn dismiss(&mut self) -> SelectOutcome {
        self.selection.apply(SelectionEvent::Dismiss).into()
    }

    /// The detail panel's close control was used.
    pub fn close_panel(&mut self) -> SelectOutcome {
        self.selection.apply(SelectionEvent::ClosePanel).into()
    }

    // Render data

    /// Property markers; empty outside property mode.
    #[must_use]
    pub fn markers(&self) -> Vec<Marker<'_>> {
        if self.selection.mode() != Mode::Property {
            return Vec::new();
        }

        self.properties
            .records
            .iter()
            .map(|property| {
                let selected = self.selection.is_property_selected(property);
                Marker {
                    name: &property.name,
                    latitude: property.latitude,
                    longitude: property.longitude,
                    radius: self
                        .properties
                        .price_range
                        .map_or(MID_RADIUS, |range| range.radius(property.price)),
                    color: color_for_type(&property.property_type),
                    selected,
                    style: MarkerStyle::for_selection(selected),
                }
            })
            .collect()
    }

    /// Area polygon layers; empty outside area mode.
    #[must_use]
    pub fn area_layers(&self) -> Vec<AreaLayer<'_>> {
        if self.selection.mode() != Mode::Area {
            return Vec::new();
        }

        self.areas
            .features
            .iter()
            .map(|area| {
                let selected = self.selection.is_area_selected(&area.name);
                AreaLayer {
                    name: &area.name,
                    geometry: &area.geometry,
                    selected,
                    style: AreaStyle::for_selection(selected),
                }
            })
            .collect()
    }

    /// Detail panel content for the focused property.
    #[must_use]
    pub fn property_detail(&self) -> Option<PropertyDetail<'_>> {
        let property = self.selection.selected_property()?;
        let after_reference = (Bound::Excluded(self.config.reference_year), Bound::Unbounded);

        Some(PropertyDetail {
            property,
            color: color_for_type(&property.property_type),
            price_per_unit: property.price_per_unit(),
            trend: property_trend(property, self.config.years),
            has_forecast: property.yearly_prices.range(after_reference).next().is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn villa_a() -> RawRow {
        row(&[
            ("name", "A"),
            ("latitude", "25.1"),
            ("longitude", "55.1"),
            ("no_bedrooms", "4"),
            ("no_bathrooms", "3"),
            ("area", "2500"),
            ("type", "Villa"),
            ("address", "Palm"),
            ("2015", "300000"),
            ("2025", "500000"),
            ("2026", "520000"),
        ])
    }

    fn apartment_b() -> RawRow {
        row(&[
            ("name", "B"),
            ("latitude", "25.5"),
            ("longitude", "55.5"),
            ("no_bedrooms", "2"),
            ("no_bathrooms", "2"),
            ("area", "0"),
            ("type", "Luxury Apartment"),
            ("address", "Marina"),
            ("2025", "1000000"),
        ])
    }

    fn square(name: &str, min: f64, max: f64) -> serde_json::Value {
        json!({
            "type": "Feature",
            "properties": { "name": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]]
            }
        })
    }

    fn engine() -> Engine {
        let mut engine = Engine::default();
        engine.load_properties(&[villa_a(), apartment_b()]);
        // Longitude and latitude share the square's bounds.
        engine.load_boundaries(vec![
            square("Around A", 25.0, 55.3),
            square("Empty", 0.0, 1.0),
        ]);
        engine
    }

    #[test]
    fn area_enclosing_only_a_reports_its_price() {
        let mut engine = engine();
        engine.switch_mode(Mode::Area);

        assert_eq!(engine.select_area("Around A"), SelectOutcome::Focused);

        let focus = engine.selection().selected_area().unwrap();
        let stats = focus.statistics.as_ref().unwrap();
        assert_eq!(stats.property_count, 1);
        assert!((stats.avg_price - 500_000.0).abs() < f64::EPSILON);
        assert!(engine.selection().panel_visible());
    }

    #[test]
    fn empty_area_is_focused_without_statistics() {
        let mut engine = engine();
        engine.switch_mode(Mode::Area);

        assert_eq!(engine.select_area("Empty"), SelectOutcome::Focused);
        assert!(engine.selection().selected_area().unwrap().statistics.is_none());
        assert_eq!(engine.area_statistics_for("Empty"), Ok(None));
    }

    #[test]
    fn area_with_unusable_geometry_is_focused_without_statistics() {
        let mut engine = engine();
        engine.areas = AreaSet::new(vec![AreaFeature {
            name: "Broken".to_string(),
            geometry: geo::MultiPolygon(vec![]),
        }]);
        engine.switch_mode(Mode::Area);

        assert_eq!(
            engine.select_area("Broken"),
            SelectOutcome::Degraded {
                error: GeometryError::Empty
            }
        );

        let focus = engine.selection().selected_area().unwrap();
        assert_eq!(focus.area.name, "Broken");
        assert!(focus.statistics.is_none());
        assert!(engine.selection().panel_visible());
        assert_eq!(
            engine.area_statistics_for("Broken"),
            Err(StatisticsError::Geometry(GeometryError::Empty))
        );
    }

    #[test]
    fn area_selection_is_gated_by_mode_and_name() {
        let mut engine = engine();
        assert_eq!(engine.select_area("Around A"), SelectOutcome::Ignored);

        engine.switch_mode(Mode::Area);
        assert_eq!(engine.select_area("Nowhere"), SelectOutcome::UnknownArea);
        assert!(engine.selection().focus().is_none());
    }

    #[test]
    fn marker_toggles_and_is_highlighted() {
        let mut engine = engine();

        assert_eq!(engine.select_marker_by_name("A"), SelectOutcome::Focused);
        let markers = engine.markers();
        assert!(markers.iter().find(|m| m.name == "A").unwrap().selected);
        assert_eq!(markers.iter().find(|m| m.name == "A").unwrap().style.stroke, "#000");
        assert!(!markers.iter().find(|m| m.name == "B").unwrap().selected);

        assert_eq!(engine.select_marker_by_name("A"), SelectOutcome::Cleared);
        assert_eq!(engine.selection(), &SelectionState::new());
        assert_eq!(engine.select_marker_by_name("Z"), SelectOutcome::UnknownProperty);
    }

    #[test]
    fn marker_encoding_follows_price_and_type() {
        let engine = engine();
        let markers = engine.markers();
        let a = markers.iter().find(|m| m.name == "A").unwrap();
        let b = markers.iter().find(|m| m.name == "B").unwrap();

        assert!(a.radius < b.radius);
        assert_eq!(a.color, "#FF3C3C");
        assert_eq!(b.color, "#FFBD43");
        assert!((a.style.fill_opacity - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn layers_follow_mode() {
        let mut engine = engine();
        assert_eq!(engine.markers().len(), 2);
        assert!(engine.area_layers().is_empty());

        engine.switch_mode(Mode::Area);
        engine.select_area("Around A");

        assert!(engine.markers().is_empty());
        let layers = engine.area_layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].style, AreaStyle::SELECTED);
        assert_eq!(layers[1].style, AreaStyle::DEFAULT);
    }

    #[test]
    fn property_detail_reports_forecast_and_guarded_per_unit() {
        let mut engine = engine();
        engine.select_marker_by_name("A");

        let detail = engine.property_detail().unwrap();
        assert!(detail.has_forecast);
        assert!((detail.price_per_unit.unwrap() - 200.0).abs() < 1e-9);
        let years: Vec<_> = detail.trend.iter().map(|p| p.year).collect();
        assert_eq!(years, [2015, 2025, 2026]);

        engine.select_marker_by_name("B");
        let detail = engine.property_detail().unwrap();
        assert!(!detail.has_forecast);
        assert!(detail.price_per_unit.is_none());
    }

    #[test]
    fn stale_property_load_is_discarded() {
        let mut engine = Engine::default();
        let older = engine.begin_property_load();
        let newer = engine.begin_property_load();

        engine.complete_property_load(newer, &[villa_a()]).unwrap();
        let stale = engine.complete_property_load(older, &[villa_a(), apartment_b()]);

        assert!(matches!(stale, Err(LoadError::Stale { generation: 1, .. })));
        assert_eq!(engine.properties().len(), 1);
    }

    #[test]
    fn stale_boundary_load_is_discarded() {
        let mut engine = Engine::default();
        let older = engine.begin_boundary_load();
        let newer = engine.begin_boundary_load();

        engine
            .complete_boundary_load(newer, vec![square("New", 0.0, 1.0)])
            .unwrap();
        assert!(
            engine
                .complete_boundary_load(older, vec![square("Old", 0.0, 1.0)])
                .is_err()
        );
        assert!(engine.area_by_name("New").is_some());
        assert!(engine.area_by_name("Old").is_none());
    }

    #[test]
    fn reload_keeps_selection_until_reselected() {
        let mut engine = engine();
        engine.switch_mode(Mode::Area);
        engine.select_area("Around A");

        let mut moved = villa_a();
        moved.insert("name".to_string(), "C".to_string());
        engine.load_properties(&[villa_a(), moved]);

        let before = engine.selection().selected_area().unwrap();
        assert_eq!(before.statistics.as_ref().unwrap().property_count, 1);

        engine.select_area("Around A");
        let after = engine.selection().selected_area().unwrap();
        assert_eq!(after.statistics.as_ref().unwrap().property_count, 2);
    }

    #[test]
    fn duplicate_property_names_resolve_to_first() {
        let mut engine = Engine::default();
        let mut second = villa_a();
        second.insert("2025".to_string(), "900000".to_string());

        let summary = engine.load_properties(&[villa_a(), second]);

        assert_eq!(engine.properties().len(), 2);
        assert_eq!(summary.warnings.len(), 1);
        let first = engine.property_by_name("A").unwrap();
        assert!((first.price - 500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_engine_is_valid() {
        let mut engine = Engine::default();
        assert!(engine.markers().is_empty());
        assert!(engine.price_range().is_none());
        assert!(engine.property_detail().is_none());
        assert_eq!(engine.dismiss(), SelectOutcome::Cleared);
        assert!(matches!(
            engine.area_statistics_for("X"),
            Err(StatisticsError::UnknownArea(_))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            reference_year: 1990,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(ConfigError::YearOutOfRange { .. })
        ));
    }

    #[test]
    fn trend_lookup_does_not_touch_selection() {
        let engine = engine();
        let trend = engine.property_trend_for("A").unwrap();
        assert_eq!(trend.len(), 3);
        assert!(engine.property_trend_for("Z").is_none());
        assert!(engine.selection().focus().is_none());
        assert_eq!(engine.map_view().zoom, 12);
    }
}
