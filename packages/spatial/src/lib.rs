#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point-in-polygon membership of properties in area boundaries.
//!
//! [`properties_in_area`] is the single geometry test the rest of the
//! system relies on. [`PropertyIndex`] answers the same question through an
//! R-tree built once per property snapshot, so large datasets only run the
//! exact polygon test on points inside the area's bounding box. Both paths
//! return identical results in input order.
//!
//! Boundaries are open: a point lying exactly on a ring (a vertex or an
//! edge, of the exterior or of a hole) is not inside the area. Points inside
//! a hole are outside the area.

use estate_map_property_models::{AreaFeature, PropertyRecord};
use geo::{BoundingRect, Contains, LineString, MultiPolygon, Point, Rect};
use rstar::{AABB, RTree, RTreeObject};

/// Smallest coordinate count of a closed ring enclosing any area.
const MIN_RING_COORDS: usize = 4;

/// Why an area's geometry cannot be used for point-in-polygon testing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The multi-polygon has no polygons.
    #[error("Geometry has no polygons")]
    Empty,

    /// A ring has too few coordinates or is not closed.
    #[error("Polygon {polygon} ring {ring} is degenerate")]
    DegenerateRing {
        /// Index of the polygon within the multi-polygon.
        polygon: usize,
        /// Ring index (0 is the exterior, holes follow).
        ring: usize,
    },

    /// A coordinate is `NaN` or infinite.
    #[error("Polygon {polygon} ring {ring} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the polygon within the multi-polygon.
        polygon: usize,
        /// Ring index (0 is the exterior, holes follow).
        ring: usize,
    },
}

/// Checks that every ring is closed, has enough coordinates to enclose an
/// area, and contains only finite coordinates.
///
/// # Errors
///
/// Returns the first [`GeometryError`] found.
pub fn validate_geometry(geometry: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if geometry.0.is_empty() {
        return Err(GeometryError::Empty);
    }

    for (polygon_idx, polygon) in geometry.0.iter().enumerate() {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for (ring_idx, ring) in rings.enumerate() {
            validate_ring(ring).map_err(|kind| kind.at(polygon_idx, ring_idx))?;
        }
    }

    Ok(())
}

enum RingProblem {
    Degenerate,
    NonFinite,
}

impl RingProblem {
    const fn at(self, polygon: usize, ring: usize) -> GeometryError {
        match self {
            Self::Degenerate => GeometryError::DegenerateRing { polygon, ring },
            Self::NonFinite => GeometryError::NonFiniteCoordinate { polygon, ring },
        }
    }
}

fn validate_ring(ring: &LineString<f64>) -> Result<(), RingProblem> {
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(RingProblem::NonFinite);
    }
    if ring.0.len() < MIN_RING_COORDS || !ring.is_closed() {
        return Err(RingProblem::Degenerate);
    }
    Ok(())
}

/// Returns the properties located strictly inside `area`, in input order.
///
/// # Errors
///
/// Returns a [`GeometryError`] if the area's geometry is unusable. Callers
/// treat this as "no data" for the area rather than a failed interaction.
pub fn properties_in_area<'a>(
    area: &AreaFeature,
    properties: &'a [PropertyRecord],
) -> Result<Vec<&'a PropertyRecord>, GeometryError> {
    let bounds = area_bounds(area)?;

    Ok(properties
        .iter()
        .filter(|p| within_bounds(&bounds, p) && contains(area, p))
        .collect())
}

/// Validates the area and returns its bounding rectangle.
fn area_bounds(area: &AreaFeature) -> Result<Rect<f64>, GeometryError> {
    validate_geometry(&area.geometry)?;
    area.geometry.bounding_rect().ok_or(GeometryError::Empty)
}

fn within_bounds(bounds: &Rect<f64>, property: &PropertyRecord) -> bool {
    let (min, max) = (bounds.min(), bounds.max());
    (min.x..=max.x).contains(&property.longitude) && (min.y..=max.y).contains(&property.latitude)
}

fn contains(area: &AreaFeature, property: &PropertyRecord) -> bool {
    area.geometry
        .contains(&Point::new(property.longitude, property.latitude))
}

/// A property position stored in the R-tree, keyed by its slice index.
struct IndexedPoint {
    position: usize,
    point: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// R-tree over the positions of one property snapshot.
///
/// Built once when a property dataset is loaded and queried with the same
/// slice it was built from.
pub struct PropertyIndex {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl std::fmt::Debug for PropertyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyIndex")
            .field("size", &self.tree.size())
            .field("len", &self.len)
            .finish()
    }
}

impl PropertyIndex {
    /// Indexes every property with finite coordinates.
    #[must_use]
    pub fn build(properties: &[PropertyRecord]) -> Self {
        let entries = properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.longitude.is_finite() && p.latitude.is_finite())
            .map(|(position, p)| IndexedPoint {
                position,
                point: [p.longitude, p.latitude],
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::debug!("Indexed {} property positions", tree.size());

        Self {
            tree,
            len: properties.len(),
        }
    }

    /// Number of indexed positions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Same contract as [`properties_in_area`], using the R-tree to skip
    /// properties outside the area's bounding box.
    ///
    /// Falls back to a linear scan if `properties` is not the slice this
    /// index was built from.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the area's geometry is unusable.
    pub fn properties_in_area<'a>(
        &self,
        area: &AreaFeature,
        properties: &'a [PropertyRecord],
    ) -> Result<Vec<&'a PropertyRecord>, GeometryError> {
        if properties.len() != self.len {
            log::warn!(
                "Property index built for {} records queried with {}; scanning linearly",
                self.len,
                properties.len()
            );
            return properties_in_area(area, properties);
        }

        let bounds = area_bounds(area)?;
        let query_env = AABB::from_corners(
            [bounds.min().x, bounds.min().y],
            [bounds.max().x, bounds.max().y],
        );

        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| entry.position)
            .filter(|&i| contains(area, &properties[i]))
            .collect();
        positions.sort_unstable();

        Ok(positions.into_iter().map(|i| &properties[i]).collect())
    }
}
