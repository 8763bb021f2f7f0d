//! Coverage aggregated by administrative region.
//!
//! Every population point is assigned to at most one region by
//! point-in-polygon lookup. Lookups are boundary inclusive, and a point
//! that touches several regions (shared borders, overlapping boundary
//! files) goes to the region with the lowest code. Points outside every
//! region are tallied as unassigned rather than dropped silently.
//!
//! The region index is built once; the per-point assignment it produces
//! is reused for both the total and the covered population, so a covered
//! point always lands in the same region as it does in the totals.

use std::collections::BTreeMap;

use access_atlas_coverage_models::{
    AdministrativeRegion, AggregationUnit, CoverageRecord, CoverageTable, PopulationPoint,
};
use access_atlas_spatial::PolygonIndex;
use geo::MultiPolygon;

use crate::CoverageError;
use crate::domain::KeyDomain;
use crate::overlay::CoveredSet;
use crate::validate::validate_geometry;

/// Admin coverage table plus the population no region claimed.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCoverage {
    /// One row per region code, ascending.
    pub table: CoverageTable,
    /// Number of points outside every region.
    pub unassigned_points: usize,
    /// Population of the points outside every region.
    pub unassigned_population: f64,
}

/// Regions grouped by code, in ascending code order.
///
/// Boundary files occasionally split a region into several features with
/// the same code; their parts are merged into one multipolygon.
fn group_regions(
    regions: &[AdministrativeRegion],
) -> Result<BTreeMap<&str, MultiPolygon<f64>>, CoverageError> {
    let mut grouped: BTreeMap<&str, MultiPolygon<f64>> = BTreeMap::new();

    for region in regions {
        let code = region.code.trim();
        if code.is_empty() {
            return Err(CoverageError::Schema {
                message: "administrative region has an empty region code".to_string(),
            });
        }
        validate_geometry(&format!("region {code}"), &region.boundary)?;

        let entry = grouped.entry(code).or_insert_with(|| MultiPolygon(vec![]));
        if !entry.0.is_empty() {
            log::debug!("Merging additional boundary parts into region {code}");
        }
        entry.0.extend(region.boundary.0.iter().cloned());
    }

    Ok(grouped)
}

/// Aggregates total and covered population per administrative region.
///
/// Regions with no population are kept with `pop_tot = 0` and null
/// percentages.
///
/// # Errors
///
/// Returns [`CoverageError::Schema`] for a region without a code and
/// [`CoverageError::Geometry`] for invalid region boundaries.
pub fn aggregate_admin(
    points: &[PopulationPoint],
    covered: &CoveredSet,
    regions: &[AdministrativeRegion],
) -> Result<AdminCoverage, CoverageError> {
    let grouped = group_regions(regions)?;
    let codes: Vec<&str> = grouped.keys().copied().collect();

    // Ordinals follow ascending code order, so the index's lowest-ordinal
    // tie-break is a lowest-code tie-break.
    let index = PolygonIndex::build(grouped.values().enumerate());
    log::info!(
        "Indexed {} regions ({} polygon parts)",
        codes.len(),
        index.len()
    );

    let mut domain = KeyDomain::with_keys(0..codes.len());
    let mut unassigned_points = 0_usize;
    let mut unassigned_population = 0.0;

    for (idx, point) in points.iter().enumerate() {
        if let Some(ordinal) = index.lookup(point.longitude, point.latitude) {
            domain.add_total(&ordinal, point.population);
            if covered.contains(idx) {
                domain.add_covered(&ordinal, point.population);
            }
        } else {
            unassigned_points += 1;
            unassigned_population += point.population;
        }
    }

    if unassigned_points > 0 {
        log::warn!(
            "{unassigned_points} population points ({unassigned_population:.0} people) \
             fall outside every administrative region"
        );
    }

    let mut geometries: Vec<MultiPolygon<f64>> = grouped.into_values().collect();
    let records = domain
        .finish()
        .into_iter()
        .map(|(ordinal, stats)| CoverageRecord {
            key: codes[ordinal].to_string(),
            stats,
            geometry: std::mem::replace(&mut geometries[ordinal], MultiPolygon(vec![])),
        })
        .collect();

    Ok(AdminCoverage {
        table: CoverageTable {
            unit: AggregationUnit::Admin,
            records,
        },
        unassigned_points,
        unassigned_population,
    })
}
