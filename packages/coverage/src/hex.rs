//! Coverage aggregated by H3 hex cell.
//!
//! Cells are derived from point coordinates directly, so the hex table
//! does not depend on administrative boundaries at all and every point
//! lands in exactly one cell. Only populated cells (cells holding at least
//! one point) appear; each cell's outline is computed once.

use access_atlas_coverage_models::{
    AggregationUnit, CoverageRecord, CoverageTable, PopulationPoint,
};
use access_atlas_spatial::hex::HexGrid;
use geo::MultiPolygon;
use h3o::CellIndex;

use crate::CoverageError;
use crate::domain::KeyDomain;
use crate::overlay::CoveredSet;

/// Assigns every point to a cell of `grid`.
///
/// # Errors
///
/// Returns [`CoverageError::Geometry`] if a point cannot be placed on the
/// grid.
pub fn assign_cells(
    points: &[PopulationPoint],
    grid: &HexGrid,
) -> Result<Vec<CellIndex>, CoverageError> {
    points
        .iter()
        .map(|point| Ok(grid.cell(point.latitude, point.longitude)?))
        .collect()
}

/// Aggregates total and covered population per hex cell.
///
/// Rows are in ascending index order. At a single resolution every index
/// renders to the same number of hex digits, so this is also ascending
/// key-string order.
///
/// # Errors
///
/// Returns [`CoverageError::Geometry`] if a point cannot be placed on the
/// grid.
pub fn aggregate_hex(
    points: &[PopulationPoint],
    covered: &CoveredSet,
    grid: &HexGrid,
) -> Result<CoverageTable, CoverageError> {
    let cells = assign_cells(points, grid)?;

    let mut domain = KeyDomain::with_keys(std::iter::empty());
    for (idx, (point, cell)) in points.iter().zip(&cells).enumerate() {
        let key = u64::from(*cell);
        domain.add_total(&key, point.population);
        if covered.contains(idx) {
            domain.add_covered(&key, point.population);
        }
    }

    let records = domain
        .finish()
        .into_iter()
        .map(|(key, stats)| {
            let cell = CellIndex::try_from(key).map_err(|e| CoverageError::Geometry {
                message: format!("hex index {key:x} is not a valid cell: {e}"),
            })?;
            Ok(CoverageRecord {
                key: cell.to_string(),
                stats,
                geometry: MultiPolygon(vec![HexGrid::boundary(cell)]),
            })
        })
        .collect::<Result<Vec<_>, CoverageError>>()?;

    log::info!(
        "Aggregated {} points into {} hex cells at resolution {}",
        points.len(),
        records.len(),
        grid.resolution()
    );

    Ok(CoverageTable {
        unit: AggregationUnit::Hex,
        records,
    })
}
