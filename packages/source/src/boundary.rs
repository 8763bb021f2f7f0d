//! Administrative boundary `GeoJSON` reader.
//!
//! Boundary files carry the region P-code in `ADM1_PCODE` / `ADM2_PCODE`
//! and the country in `ADM0_PCODE`. Region-wide files are filtered down to
//! the requested country; country files without `ADM0_PCODE` are taken
//! whole.

use std::path::Path;

use access_atlas_coverage_models::AdministrativeRegion;
use geo::MultiPolygon;
use geojson::{Feature, GeoJson};

use crate::isochrone::collect_polygons;
use crate::{Country, SourceError};

fn string_property(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

/// Parses the regions of `country` from a boundary `FeatureCollection`.
///
/// # Errors
///
/// Returns [`SourceError::GeoJson`] for malformed `GeoJSON` and
/// [`SourceError::Schema`] when the content is not a `FeatureCollection`
/// or a feature lacks its region code or geometry.
pub fn parse_boundaries(
    content: &str,
    country: &Country,
) -> Result<Vec<AdministrativeRegion>, SourceError> {
    let GeoJson::FeatureCollection(collection) = content.parse::<GeoJson>()? else {
        return Err(SourceError::Schema {
            message: "boundary file is not a FeatureCollection".to_string(),
        });
    };

    let field = country.admin_level.pcode_field();
    let mut regions = Vec::new();
    let mut skipped = 0_usize;

    for (idx, feature) in collection.features.into_iter().enumerate() {
        if let Some(adm0) = string_property(&feature, "ADM0_PCODE")
            && !country.matches_pcode(&adm0)
        {
            skipped += 1;
            continue;
        }

        let code = string_property(&feature, field).ok_or_else(|| SourceError::Schema {
            message: format!("boundary feature {idx} has no {field}"),
        })?;
        let geometry = feature.geometry.ok_or_else(|| SourceError::Schema {
            message: format!("boundary feature {code} has no geometry"),
        })?;

        let mut parts = Vec::new();
        collect_polygons(geometry, &mut parts)?;
        regions.push(AdministrativeRegion::new(code, MultiPolygon(parts)));
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} boundary features outside {}", country.iso3);
    }

    Ok(regions)
}

/// Loads the regions of `country` from a boundary file.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] if the file is missing, plus any
/// error from [`parse_boundaries`].
pub fn load_boundaries(
    path: &Path,
    country: &Country,
) -> Result<Vec<AdministrativeRegion>, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let regions = parse_boundaries(&content, country)?;
    log::info!(
        "Loaded {} {} regions for {} from {}",
        regions.len(),
        country.admin_level,
        country.iso3,
        path.display()
    );
    Ok(regions)
}
