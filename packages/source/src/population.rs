//! Gridded population CSV reader.
//!
//! Population grids come as CSV with `latitude`, `longitude` and one or
//! more estimate columns (e.g. `population_2019`, `population_2020`).
//! When several estimate columns exist, the newer of the last two is used.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use access_atlas_coverage_models::PopulationPoint;

use crate::SourceError;

/// Column positions resolved from a CSV header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Columns {
    latitude: usize,
    longitude: usize,
    population: usize,
}

/// Resolves the latitude, longitude and population columns.
fn resolve_columns(headers: &[String]) -> Result<Columns, SourceError> {
    let find = |needle: &str| {
        headers
            .iter()
            .position(|h| h.to_ascii_lowercase().contains(needle))
            .ok_or_else(|| SourceError::Schema {
                message: format!("population CSV has no {needle}* column"),
            })
    };
    let latitude = find("latit")?;
    let longitude = find("long")?;

    let estimates: Vec<usize> = (0..headers.len())
        .filter(|&i| i != latitude && i != longitude && !headers[i].is_empty())
        .collect();

    let population = match estimates.as_slice() {
        [] => {
            return Err(SourceError::Schema {
                message: "population CSV has no population column".to_string(),
            });
        }
        [only] => *only,
        [.., previous, last] => {
            if headers[*last] > headers[*previous] {
                *last
            } else {
                *previous
            }
        }
    };

    log::debug!("Using population column '{}'", headers[population]);

    Ok(Columns {
        latitude,
        longitude,
        population,
    })
}

fn parse_field(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<f64, SourceError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<f64>().map_err(|_| SourceError::Schema {
        message: format!("line {line}: {name} value '{raw}' is not a number"),
    })
}

/// Reads population points from CSV.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] for malformed CSV and
/// [`SourceError::Schema`] for missing columns or non-numeric values.
pub fn read_population<R: Read>(reader: R) -> Result<Vec<PopulationPoint>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();
    let columns = resolve_columns(&headers)?;

    let mut points = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);

        points.push(PopulationPoint::new(
            parse_field(&record, columns.latitude, "latitude", line)?,
            parse_field(&record, columns.longitude, "longitude", line)?,
            parse_field(&record, columns.population, "population", line)?,
        ));
    }

    Ok(points)
}

/// Loads population points from a `.csv` or `.csv.gz` file.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] if the file is missing, plus any
/// error from [`read_population`].
pub fn load_population(path: &Path) -> Result<Vec<PopulationPoint>, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = BufReader::new(File::open(path)?);
    let is_gzipped = path.extension().is_some_and(|ext| ext == "gz");

    let points = if is_gzipped {
        read_population(flate2::read::GzDecoder::new(file))?
    } else {
        read_population(file)?
    };

    log::info!(
        "Loaded {} population points from {}",
        points.len(),
        path.display()
    );
    Ok(points)
}
