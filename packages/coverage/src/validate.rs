//! Input checks run before any overlay or join.
//!
//! All geometry handed to the engine must be WGS84 longitude/latitude.
//! Coordinates outside that range almost always mean a projected CRS
//! slipped through, which would silently match nothing, so they are
//! rejected as [`CoverageError::Geometry`].

use access_atlas_coverage_models::PopulationPoint;
use geo::algorithm::sweep::Intersections;
use geo::{CoordsIter, LineString, MultiPolygon, Polygon, Relate, RemoveRepeatedPoints};

use crate::CoverageError;

/// Checks every population point for usable coordinates and population.
///
/// # Errors
///
/// Returns [`CoverageError::Geometry`] for coordinates outside the WGS84
/// range and [`CoverageError::Schema`] for negative or non-finite
/// population values.
pub fn validate_points(points: &[PopulationPoint]) -> Result<(), CoverageError> {
    for (idx, point) in points.iter().enumerate() {
        if !in_wgs84_range(point.longitude, point.latitude) {
            return Err(CoverageError::Geometry {
                message: format!(
                    "population point {idx} at ({}, {}) is outside the WGS84 range",
                    point.latitude, point.longitude
                ),
            });
        }
        if !point.population.is_finite() || point.population < 0.0 {
            return Err(CoverageError::Schema {
                message: format!(
                    "population point {idx} has unusable population {}",
                    point.population
                ),
            });
        }
    }
    Ok(())
}

/// Checks that a multipolygon is WGS84 and that every part is a valid
/// polygon (closed rings, no self-intersections).
///
/// Parts may overlap each other; only each part on its own must be valid.
///
/// # Errors
///
/// Returns [`CoverageError::Geometry`] naming `label` on the first problem.
pub fn validate_geometry(label: &str, geometry: &MultiPolygon<f64>) -> Result<(), CoverageError> {
    if let Some(coord) = geometry
        .coords_iter()
        .find(|c| !in_wgs84_range(c.x, c.y))
    {
        return Err(CoverageError::Geometry {
            message: format!(
                "{label} has coordinate ({}, {}) outside the WGS84 range",
                coord.x, coord.y
            ),
        });
    }

    for (part, polygon) in geometry.0.iter().enumerate() {
        if let Some(problem) = polygon_problem(polygon) {
            return Err(CoverageError::Geometry {
                message: format!("{label} part {part} is not a valid polygon: {problem}"),
            });
        }
    }

    Ok(())
}

/// Describes the first structural problem of a polygon, if any.
///
/// Rings are checked for self-intersection with a sweep over their
/// segments, so dense coastlines stay close to `O(n log n)`.
fn polygon_problem(polygon: &Polygon<f64>) -> Option<String> {
    let exterior = polygon.exterior();
    if exterior.0.is_empty() {
        return None;
    }

    for (idx, ring) in std::iter::once(exterior)
        .chain(polygon.interiors())
        .enumerate()
    {
        let role = if idx == 0 {
            "exterior ring".to_string()
        } else {
            format!("interior ring {}", idx - 1)
        };

        if !ring.is_closed() {
            return Some(format!("{role} is not closed"));
        }
        if ring.remove_repeated_points().0.len() < 4 {
            return Some(format!("{role} has fewer than 3 distinct points"));
        }
        if ring_self_intersects(ring) {
            return Some(format!("{role} has a self-intersection"));
        }
    }

    if !polygon.interiors().is_empty() {
        let shell = Polygon::new(exterior.clone(), vec![]);
        for (idx, hole) in polygon.interiors().iter().enumerate() {
            if !shell.relate(hole).is_contains() {
                return Some(format!("interior ring {idx} is outside the exterior ring"));
            }
        }
    }

    None
}

/// Whether two segments of a ring cross or touch anywhere other than at a
/// shared vertex of consecutive segments.
fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    Intersections::from_iter(ring.lines())
        .any(|(first, second, _)| first.start != second.end && first.end != second.start)
}

fn in_wgs84_range(lng: f64, lat: f64) -> bool {
    (-180.0..=180.0).contains(&lng) && (-90.0..=90.0).contains(&lat)
}
