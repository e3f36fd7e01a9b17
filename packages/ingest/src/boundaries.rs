//! Boundary feature admission.
//!
//! A feature is admitted iff it carries a non-empty `name` property and a
//! polygon or multi-polygon geometry that passes
//! [`validate_geometry`](estate_map_spatial::validate_geometry). Names are
//! unique after admission: the first feature with a name wins.
//!
//! Features arrive as raw JSON values and are decoded one at a time, so a
//! feature `geojson` refuses to decode is skipped without affecting its
//! neighbours.

use std::collections::BTreeSet;

use estate_map_ingest_models::{AREA_NAME_PROPERTY, FeatureSkipReason, IngestSummary};
use estate_map_property_models::AreaFeature;
use estate_map_spatial::validate_geometry;
use geo::{Geometry, MultiPolygon};
use geojson::Feature;
use serde_json::Value;

/// Converts raw `GeoJSON` feature objects into area features, in input
/// order.
#[must_use]
pub fn admit_features(
    features: impl IntoIterator<Item = Value>,
) -> (Vec<AreaFeature>, IngestSummary) {
    let mut summary = IngestSummary::default();
    let mut areas = Vec::new();
    let mut seen_names = BTreeSet::new();

    for (index, raw) in features.into_iter().enumerate() {
        let name = feature_name(&raw);

        let admitted = name
            .clone()
            .ok_or(FeatureSkipReason::MissingName)
            .and_then(|name| {
                if seen_names.contains(&name) {
                    return Err(FeatureSkipReason::DuplicateName);
                }
                let feature = Feature::from_json_value(raw).map_err(|e| {
                    log::debug!("Undecodable boundary feature {index}: {e}");
                    FeatureSkipReason::MalformedGeometry
                })?;
                let geometry = feature_geometry(feature)?;
                Ok(AreaFeature { name, geometry })
            });

        match admitted {
            Ok(area) => {
                seen_names.insert(area.name.clone());
                areas.push(area);
            }
            Err(reason) => {
                log::debug!("Skipping boundary feature {index} ({name:?}): {reason}");
                summary.skip_feature(index, name, reason);
            }
        }
    }

    summary.admitted = areas.len();

    log::info!(
        "Admitted {} of {} boundary features ({} skipped)",
        summary.admitted,
        summary.total(),
        summary.dropped
    );

    (areas, summary)
}

/// Trimmed, non-empty `name` property of a raw feature object.
#[must_use]
pub fn feature_name(feature: &Value) -> Option<String> {
    feature
        .get("properties")
        .and_then(|props| props.get(AREA_NAME_PROPERTY))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
}

/// Extracts a validated multi-polygon from a decoded feature. A single
/// polygon is wrapped into a one-element multi-polygon.
///
/// # Errors
///
/// Returns the [`FeatureSkipReason`] describing why the geometry cannot be
/// used.
pub fn feature_geometry(feature: Feature) -> Result<MultiPolygon<f64>, FeatureSkipReason> {
    let geometry = feature.geometry.ok_or(FeatureSkipReason::MissingGeometry)?;

    let converted: Geometry<f64> = geometry
        .try_into()
        .map_err(|_| FeatureSkipReason::MalformedGeometry)?;

    let multi = match converted {
        Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
        Geometry::MultiPolygon(multi) => multi,
        _ => return Err(FeatureSkipReason::UnsupportedGeometry),
    };

    validate_geometry(&multi).map_err(|e| {
        log::debug!("Malformed boundary geometry: {e}");
        FeatureSkipReason::MalformedGeometry
    })?;

    Ok(multi)
}
