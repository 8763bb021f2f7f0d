#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial indexes for coverage aggregation.
//!
//! [`PolygonIndex`] stores polygon parts in an R-tree and answers
//! point-in-polygon questions: "which region owns this point" for
//! administrative boundaries and "is this point reachable" for isochrones.
//! [`hex::HexGrid`] assigns points to H3 cells and derives cell outlines.
//!
//! Indexes are built once per coverage invocation and reused for both the
//! total and the covered population.

pub mod hex;

use geo::{BoundingRect, Intersects, MultiPolygon, Point, Polygon};
use rstar::{AABB, RTree, RTreeObject};

/// Errors raised while mapping coordinates onto the hex grid.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// Coordinate cannot be represented as an H3 lat/lng.
    #[error("Invalid coordinate: {0}")]
    LatLng(#[from] h3o::error::InvalidLatLng),

    /// Resolution outside the H3 range.
    #[error("Invalid hex resolution: {0}")]
    Resolution(#[from] h3o::error::InvalidResolution),
}

/// A single polygon part stored in the R-tree, tagged with the ordinal of
/// the geometry it belongs to.
struct PolygonEntry {
    ordinal: usize,
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
}

impl RTreeObject for PolygonEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over the parts of a set of multipolygons.
///
/// Each multipolygon is identified by an ordinal chosen by the caller.
/// Multipolygons are split into their parts before indexing so that
/// scattered geometries (islands, per-facility isochrones) get tight
/// envelopes. Lookups are boundary inclusive.
pub struct PolygonIndex {
    tree: RTree<PolygonEntry>,
}

impl PolygonIndex {
    /// Builds the index from `(ordinal, geometry)` pairs.
    ///
    /// Parts without a bounding box (no coordinates) are skipped.
    #[must_use]
    pub fn build<'a>(geometries: impl IntoIterator<Item = (usize, &'a MultiPolygon<f64>)>) -> Self {
        let entries: Vec<PolygonEntry> = geometries
            .into_iter()
            .flat_map(|(ordinal, multi_polygon)| {
                multi_polygon.0.iter().filter_map(move |polygon| {
                    let envelope = compute_envelope(polygon)?;
                    Some(PolygonEntry {
                        ordinal,
                        envelope,
                        polygon: polygon.clone(),
                    })
                })
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::debug!("Built polygon index with {} parts", tree.size());

        Self { tree }
    }

    /// Returns the smallest ordinal whose geometry contains or touches the
    /// point, or `None` when no geometry does.
    ///
    /// Points on a border shared by several geometries resolve to the
    /// lowest ordinal, so a caller that numbers regions in ascending code
    /// order gets a stable lowest-code tie-break.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<usize> {
        let point = Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.intersects(&point))
            .map(|entry| entry.ordinal)
            .min()
    }

    /// Returns `true` when any indexed geometry contains or touches the
    /// point. Overlapping parts are not double counted.
    #[must_use]
    pub fn covers(&self, lng: f64, lat: f64) -> bool {
        let point = Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .any(|entry| entry.polygon.intersects(&point))
    }

    /// Number of indexed polygon parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` when nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Compute the bounding box envelope for a [`Polygon`].
fn compute_envelope(polygon: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon
        .bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

#[cfg(test)]
mod tests {
    use geo::{Rect, coord};

    use super::*;

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }).to_polygon(),
        ])
    }

    #[test]
    fn finds_the_containing_geometry() {
        let west = square(0.0, 0.0, 1.0, 1.0);
        let east = square(1.0, 0.0, 2.0, 1.0);
        let index = PolygonIndex::build([(0, &west), (1, &east)]);

        assert_eq!(index.lookup(0.5, 0.5), Some(0));
        assert_eq!(index.lookup(1.5, 0.5), Some(1));
        assert_eq!(index.lookup(3.0, 0.5), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn shared_border_resolves_to_lowest_ordinal() {
        let west = square(0.0, 0.0, 1.0, 1.0);
        let east = square(1.0, 0.0, 2.0, 1.0);

        let index = PolygonIndex::build([(1, &east), (0, &west)]);
        assert_eq!(index.lookup(1.0, 0.5), Some(0));

        let index = PolygonIndex::build([(7, &west), (3, &east)]);
        assert_eq!(index.lookup(1.0, 0.5), Some(3));
    }

    #[test]
    fn overlapping_parts_cover_once() {
        let first = square(0.0, 0.0, 2.0, 2.0);
        let second = square(1.0, 1.0, 3.0, 3.0);
        let index = PolygonIndex::build([(0, &first), (1, &second)]);

        assert!(index.covers(1.5, 1.5));
        assert!(index.covers(2.0, 2.0));
        assert!(!index.covers(2.5, 0.5));
    }

    #[test]
    fn empty_index_covers_nothing() {
        let empty = MultiPolygon::<f64>(vec![]);
        let index = PolygonIndex::build([(0, &empty)]);

        assert!(index.is_empty());
        assert!(!index.covers(0.0, 0.0));
        assert_eq!(index.lookup(0.0, 0.0), None);
    }
}
