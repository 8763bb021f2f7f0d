//! Isochrone overlay: which population points are reachable.

use access_atlas_coverage_models::{IsochroneGeometry, PopulationPoint};
use access_atlas_spatial::PolygonIndex;

use crate::CoverageError;
use crate::validate::validate_geometry;

/// The reachable subset of a population point set.
///
/// Identity is the point's position in the input slice, so a point inside
/// several overlapping isochrone parts is still covered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoveredSet {
    mask: Vec<bool>,
    count: usize,
}

impl CoveredSet {
    /// A set in which no point is covered.
    #[must_use]
    pub fn none(len: usize) -> Self {
        Self {
            mask: vec![false; len],
            count: 0,
        }
    }

    /// Whether the point at `idx` is covered.
    #[must_use]
    pub fn contains(&self, idx: usize) -> bool {
        self.mask.get(idx).copied().unwrap_or(false)
    }

    /// Number of covered points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` when no point is covered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over the covered points of `points`, the slice this set
    /// was computed from.
    pub fn iter<'a>(
        &'a self,
        points: &'a [PopulationPoint],
    ) -> impl Iterator<Item = &'a PopulationPoint> + 'a {
        points
            .iter()
            .zip(&self.mask)
            .filter_map(|(point, covered)| covered.then_some(point))
    }

    /// Total population of the covered points.
    #[must_use]
    pub fn population(&self, points: &[PopulationPoint]) -> f64 {
        self.iter(points).map(|point| point.population).sum()
    }
}

/// Finds the points that lie inside (or on the edge of) the isochrone.
///
/// An empty isochrone covers nothing and is not an error.
///
/// # Errors
///
/// Returns [`CoverageError::Geometry`] if the isochrone is not valid WGS84
/// polygon geometry.
pub fn covered_points(
    points: &[PopulationPoint],
    isochrone: &IsochroneGeometry,
) -> Result<CoveredSet, CoverageError> {
    if isochrone.is_empty() {
        log::info!("Isochrone is empty; no population is covered");
        return Ok(CoveredSet::none(points.len()));
    }

    validate_geometry("isochrone", &isochrone.geometry)?;

    let index = PolygonIndex::build([(0, &isochrone.geometry)]);
    log::debug!("Indexed {} isochrone parts", index.len());

    let mask: Vec<bool> = points
        .iter()
        .map(|point| index.covers(point.longitude, point.latitude))
        .collect();
    let count = mask.iter().filter(|covered| **covered).count();

    log::info!("{count} of {} population points are covered", points.len());

    Ok(CoveredSet { mask, count })
}
