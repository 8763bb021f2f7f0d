//! Coverage invocation: overlay, both aggregations, and the report.

use access_atlas_coverage_models::{
    AdministrativeRegion, CoverageKey, CoverageStats, CoverageTable, IsochroneGeometry,
    PopulationPoint,
};

use crate::admin::aggregate_admin;
use crate::hex::aggregate_hex;
use crate::overlay::covered_points;
use crate::validate::validate_points;
use crate::{CoverageConfig, CoverageError};

/// Fully materialized inputs for one coverage key.
#[derive(Debug, Clone, Copy)]
pub struct CoverageInputs<'a> {
    /// Which invocation this is.
    pub key: &'a CoverageKey,
    /// Population points of the country and population group.
    pub population: &'a [PopulationPoint],
    /// Union of the amenity isochrones, `None` if it was never produced.
    pub isochrone: Option<&'a IsochroneGeometry>,
    /// Administrative regions at the country's aggregation level.
    pub regions: &'a [AdministrativeRegion],
}

/// Result of one coverage invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Which invocation produced this report.
    pub key: CoverageKey,
    /// Configuration the report was computed with.
    pub config: CoverageConfig,
    /// Coverage per administrative region.
    pub admin: CoverageTable,
    /// Coverage per hex cell.
    pub hex: CoverageTable,
    /// Coverage over every input point.
    pub national: CoverageStats,
    /// Points outside every administrative region.
    pub unassigned_points: usize,
    /// Population outside every administrative region.
    pub unassigned_population: f64,
}

/// Runs a full coverage invocation.
///
/// The invocation is all-or-nothing: on error neither table is produced.
///
/// # Errors
///
/// * [`CoverageError::DataNotFound`] if the population, the isochrone or
///   the regions are missing or empty. An isochrone that is present but
///   covers no area is valid and yields zero coverage.
/// * [`CoverageError::Geometry`] for invalid or non-WGS84 geometry.
/// * [`CoverageError::Schema`] for unusable population values or region
///   codes.
/// * [`CoverageError::Config`] for an invalid configuration.
pub fn compute_coverage(
    inputs: &CoverageInputs<'_>,
    config: &CoverageConfig,
) -> Result<CoverageReport, CoverageError> {
    let key = inputs.key;
    let grid = config.hex_grid()?;

    if inputs.population.is_empty() {
        return Err(not_found("population points", key));
    }
    let Some(isochrone) = inputs.isochrone else {
        return Err(not_found("isochrone", key));
    };
    if inputs.regions.is_empty() {
        return Err(not_found("administrative regions", key));
    }

    log::info!(
        "Computing coverage for {key}: {} points, {} regions, {} isochrone parts",
        inputs.population.len(),
        inputs.regions.len(),
        isochrone.geometry.0.len()
    );

    validate_points(inputs.population)?;
    let covered = covered_points(inputs.population, isochrone)?;

    let admin = aggregate_admin(inputs.population, &covered, inputs.regions)?;
    let hex = aggregate_hex(inputs.population, &covered, &grid)?;

    let total: f64 = inputs.population.iter().map(|p| p.population).sum();
    let national = CoverageStats::from_totals(total, covered.population(inputs.population));

    match national.per_cov {
        Some(per_cov) => log::info!(
            "Coverage for {key}: {:.0} of {:.0} people ({per_cov:.1}%)",
            national.pop_cov,
            national.pop_tot
        ),
        None => log::warn!("Coverage for {key}: population total is zero"),
    }

    Ok(CoverageReport {
        key: key.clone(),
        config: *config,
        admin: admin.table,
        hex,
        national,
        unassigned_points: admin.unassigned_points,
        unassigned_population: admin.unassigned_population,
    })
}

fn not_found(what: &str, key: &CoverageKey) -> CoverageError {
    CoverageError::DataNotFound {
        what: what.to_string(),
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use access_atlas_coverage_models::{
        Amenity, FacilityGroup, PopulationGroup, TravelProfile,
    };
    use geo::{Centroid, LineString, MultiPolygon, Polygon, Rect, coord};
    use h3o::CellIndex;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn key(minute: u16) -> CoverageKey {
        CoverageKey {
            country: "COL".to_string(),
            amenity: Amenity::Healthcare,
            profile: TravelProfile::Walking,
            minute,
            group: FacilityGroup::Official,
            popgroup: PopulationGroup::TotalPopulation,
        }
    }

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }).to_polygon(),
        ])
    }

    /// R1 is the western half, R2 the eastern half of a box near Bogota.
    fn regions() -> Vec<AdministrativeRegion> {
        vec![
            AdministrativeRegion::new("R1", square(-74.2, 4.5, -74.0, 4.7)),
            AdministrativeRegion::new("R2", square(-74.0, 4.5, -73.8, 4.7)),
        ]
    }

    /// A and B in R1, C in R2.
    fn population() -> Vec<PopulationPoint> {
        vec![
            PopulationPoint::new(4.55, -74.15, 100.0),
            PopulationPoint::new(4.65, -74.05, 200.0),
            PopulationPoint::new(4.60, -73.90, 300.0),
        ]
    }

    fn run(isochrone: &IsochroneGeometry) -> CoverageReport {
        let key = key(15);
        let population = population();
        let regions = regions();
        let inputs = CoverageInputs {
            key: &key,
            population: &population,
            isochrone: Some(isochrone),
            regions: &regions,
        };
        compute_coverage(&inputs, &CoverageConfig::default()).unwrap()
    }

    fn assert_record_invariants(table: &CoverageTable) {
        for record in &table.records {
            let stats = record.stats;
            assert!(stats.pop_cov >= 0.0, "{} has negative pop_cov", record.key);
            assert!(stats.pop_cov <= stats.pop_tot, "{} over-covered", record.key);
            if stats.pop_tot > 0.0 {
                let closure = stats.per_cov.unwrap() + stats.per_uncov.unwrap();
                assert!((closure - 100.0).abs() < EPSILON, "{} closure", record.key);
            } else {
                assert_eq!(stats.per_cov, None);
                assert_eq!(stats.per_uncov, None);
            }
        }
    }

    #[test]
    fn half_covered_country() {
        let report = run(&IsochroneGeometry::new(square(-74.2, 4.5, -74.0, 4.7)));

        assert!((report.national.pop_tot - 600.0).abs() < EPSILON);
        assert!((report.national.pop_cov - 300.0).abs() < EPSILON);
        assert!((report.national.pop_uncov - 300.0).abs() < EPSILON);
        assert_eq!(report.national.per_cov, Some(50.0));

        let r1 = report.admin.get("R1").unwrap();
        assert!((r1.stats.pop_tot - 300.0).abs() < EPSILON);
        assert_eq!(r1.stats.per_cov, Some(100.0));
        let r2 = report.admin.get("R2").unwrap();
        assert!((r2.stats.pop_tot - 300.0).abs() < EPSILON);
        assert_eq!(r2.stats.per_cov, Some(0.0));

        assert_eq!(report.admin.summary().per_cov, Some(50.0));
        assert_eq!(report.hex.summary().per_cov, Some(50.0));
    }

    #[test]
    fn empty_isochrone_covers_no_one() {
        let report = run(&IsochroneGeometry::default());

        for record in report.admin.records.iter().chain(&report.hex.records) {
            assert!(record.stats.pop_cov.abs() < EPSILON);
            assert_eq!(record.stats.per_cov, Some(0.0));
        }
        assert_eq!(report.national.per_cov, Some(0.0));
    }

    #[test]
    fn population_mass_is_conserved_across_tables() {
        let report = run(&IsochroneGeometry::new(square(-74.1, 4.5, -73.85, 4.7)));
        let input_total: f64 = population().iter().map(|p| p.population).sum();

        assert!((report.admin.summary().pop_tot - input_total).abs() < EPSILON);
        assert!((report.hex.summary().pop_tot - input_total).abs() < EPSILON);
        assert!((report.admin.summary().pop_cov - report.hex.summary().pop_cov).abs() < EPSILON);
        assert_eq!(report.unassigned_points, 0);
    }

    #[test]
    fn every_record_respects_bounds_and_closure() {
        for isochrone in [
            IsochroneGeometry::default(),
            IsochroneGeometry::new(square(-74.2, 4.5, -74.0, 4.7)),
            IsochroneGeometry::new(square(-74.3, 4.4, -73.7, 4.8)),
        ] {
            let report = run(&isochrone);
            assert_record_invariants(&report.admin);
            assert_record_invariants(&report.hex);
        }
    }

    #[test]
    fn identical_inputs_give_identical_reports() {
        let isochrone = IsochroneGeometry::new(square(-74.1, 4.5, -73.85, 4.7));
        let first = run(&isochrone);
        let second = run(&isochrone);

        assert_eq!(first, second);
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn coverage_never_shrinks_as_minutes_grow() {
        let population = population();
        let regions = regions();
        let isochrones = [
            (5, IsochroneGeometry::new(square(-74.16, 4.54, -74.14, 4.56))),
            (10, IsochroneGeometry::new(square(-74.2, 4.5, -74.0, 4.7))),
            (15, IsochroneGeometry::new(square(-74.2, 4.5, -73.95, 4.7))),
            (30, IsochroneGeometry::new(square(-74.2, 4.5, -73.8, 4.7))),
        ];

        let mut previous = 0.0;
        for (minute, isochrone) in &isochrones {
            let key = key(*minute);
            let inputs = CoverageInputs {
                key: &key,
                population: &population,
                isochrone: Some(isochrone),
                regions: &regions,
            };
            let report = compute_coverage(&inputs, &CoverageConfig::default()).unwrap();
            assert!(report.national.pop_cov >= previous, "shrank at {minute} min");
            assert!(report.admin.summary().pop_cov >= previous);
            previous = report.national.pop_cov;
        }
        assert!((previous - 600.0).abs() < EPSILON);
    }

    #[test]
    fn hex_ids_survive_a_boundary_round_trip() {
        let report = run(&IsochroneGeometry::default());
        let grid = CoverageConfig::default().hex_grid().unwrap();

        assert!(!report.hex.is_empty());
        for record in &report.hex.records {
            let cell = CellIndex::from_str(&record.key).unwrap();
            let centroid = record.geometry.centroid().unwrap();
            assert_eq!(grid.cell(centroid.y(), centroid.x()).unwrap(), cell);
        }
    }

    #[test]
    fn zero_population_regions_report_null_shares() {
        let key = key(15);
        let population = vec![PopulationPoint::new(4.55, -74.15, 100.0)];
        let regions = regions();
        let isochrone = IsochroneGeometry::default();
        let inputs = CoverageInputs {
            key: &key,
            population: &population,
            isochrone: Some(&isochrone),
            regions: &regions,
        };
        let report = compute_coverage(&inputs, &CoverageConfig::default()).unwrap();

        let r2 = report.admin.get("R2").unwrap();
        assert!(r2.stats.pop_tot.abs() < EPSILON);
        assert_eq!(r2.stats.per_cov, None);
        assert_eq!(report.admin.len(), 2);
    }

    #[test]
    fn missing_inputs_are_data_not_found() {
        let key = key(15);
        let population = population();
        let regions = regions();
        let isochrone = IsochroneGeometry::default();
        let config = CoverageConfig::default();

        let cases = [
            CoverageInputs {
                key: &key,
                population: &[],
                isochrone: Some(&isochrone),
                regions: &regions,
            },
            CoverageInputs {
                key: &key,
                population: &population,
                isochrone: None,
                regions: &regions,
            },
            CoverageInputs {
                key: &key,
                population: &population,
                isochrone: Some(&isochrone),
                regions: &[],
            },
        ];

        for inputs in &cases {
            let err = compute_coverage(inputs, &config).unwrap_err();
            assert!(matches!(err, CoverageError::DataNotFound { .. }), "{err}");
        }
    }

    #[test]
    fn invalid_isochrone_aborts_the_invocation() {
        let key = key(15);
        let population = population();
        let regions = regions();
        let bowtie = IsochroneGeometry::new(MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (-74.2, 4.5),
                (-74.0, 4.7),
                (-74.0, 4.5),
                (-74.2, 4.7),
                (-74.2, 4.5),
            ]),
            vec![],
        )]));
        let inputs = CoverageInputs {
            key: &key,
            population: &population,
            isochrone: Some(&bowtie),
            regions: &regions,
        };

        let err = compute_coverage(&inputs, &CoverageConfig::default()).unwrap_err();
        assert!(matches!(err, CoverageError::Geometry { .. }));
    }

    #[test]
    fn projected_regions_are_a_geometry_error() {
        let key = key(15);
        let population = population();
        let regions = vec![AdministrativeRegion::new(
            "R1",
            square(500_000.0, 400_000.0, 600_000.0, 500_000.0),
        )];
        let isochrone = IsochroneGeometry::default();
        let inputs = CoverageInputs {
            key: &key,
            population: &population,
            isochrone: Some(&isochrone),
            regions: &regions,
        };

        let err = compute_coverage(&inputs, &CoverageConfig::default()).unwrap_err();
        assert!(matches!(err, CoverageError::Geometry { .. }));
    }

    #[test]
    fn bad_resolution_is_a_config_error() {
        let key = key(15);
        let population = population();
        let regions = regions();
        let isochrone = IsochroneGeometry::default();
        let inputs = CoverageInputs {
            key: &key,
            population: &population,
            isochrone: Some(&isochrone),
            regions: &regions,
        };
        let config = CoverageConfig {
            hex_resolution: 20,
            ..CoverageConfig::default()
        };

        let err = compute_coverage(&inputs, &config).unwrap_err();
        assert!(matches!(err, CoverageError::Config { .. }));
    }
}
