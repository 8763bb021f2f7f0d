//! Isochrone `GeoJSON` reader.
//!
//! Accepts a `FeatureCollection`, a single `Feature` or a bare geometry.
//! All polygon parts are gathered into one multipolygon; overlapping parts
//! from neighbouring facilities are kept as they are, since the overlay
//! counts each point once regardless.

use std::path::Path;

use access_atlas_coverage_models::IsochroneGeometry;
use geo::{Geometry, MultiPolygon, Polygon};
use geojson::GeoJson;

use crate::SourceError;

/// Appends the polygon parts of a `GeoJSON` geometry to `parts`.
///
/// # Errors
///
/// Returns [`SourceError::Schema`] for non-areal geometry (points, lines).
pub(crate) fn collect_polygons(
    geometry: geojson::Geometry,
    parts: &mut Vec<Polygon<f64>>,
) -> Result<(), SourceError> {
    let geometry: Geometry<f64> = geometry.try_into()?;
    push_polygons(geometry, parts)
}

fn push_polygons(
    geometry: Geometry<f64>,
    parts: &mut Vec<Polygon<f64>>,
) -> Result<(), SourceError> {
    match geometry {
        Geometry::Polygon(polygon) => parts.push(polygon),
        Geometry::MultiPolygon(multi_polygon) => parts.extend(multi_polygon.0),
        Geometry::GeometryCollection(collection) => {
            for geometry in collection.0 {
                push_polygons(geometry, parts)?;
            }
        }
        other => {
            return Err(SourceError::Schema {
                message: format!("expected polygon geometry, found {}", geometry_name(&other)),
            });
        }
    }
    Ok(())
}

const fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Parses an isochrone union from `GeoJSON` text.
///
/// Features without geometry are skipped; an empty collection yields an
/// empty isochrone.
///
/// # Errors
///
/// Returns [`SourceError::GeoJson`] for malformed `GeoJSON` and
/// [`SourceError::Schema`] for non-polygon geometry.
pub fn parse_isochrone(content: &str) -> Result<IsochroneGeometry, SourceError> {
    let mut parts = Vec::new();

    match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    collect_polygons(geometry, &mut parts)?;
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                collect_polygons(geometry, &mut parts)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_polygons(geometry, &mut parts)?,
    }

    Ok(IsochroneGeometry::new(MultiPolygon(parts)))
}

/// Loads an isochrone union from disk.
///
/// Returns `Ok(None)` when the file does not exist, so the engine can
/// report the missing input for its key.
///
/// # Errors
///
/// Returns any I/O or parse error from reading an existing file.
pub fn load_isochrone(path: &Path) -> Result<Option<IsochroneGeometry>, SourceError> {
    if !path.exists() {
        log::warn!("No isochrone at {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let isochrone = parse_isochrone(&content)?;
    log::info!(
        "Loaded isochrone with {} parts from {}",
        isochrone.geometry.0.len(),
        path.display()
    );
    Ok(Some(isochrone))
}
