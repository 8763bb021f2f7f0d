//! Coverage table writers.
//!
//! Each table is written twice: as a `GeoJSON` `FeatureCollection` whose
//! feature properties are the table columns, and as a CSV of the same
//! columns without geometry. An undefined share (zero population) is
//! `null` in `GeoJSON` and an empty cell in CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use access_atlas_coverage::{CoverageConfig, CoverageReport};
use access_atlas_coverage_models::{CoverageKey, CoverageRecord, CoverageStats, CoverageTable};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;

use crate::SourceError;

const CSV_HEADER: [&str; 6] = [
    "key",
    "pop_tot",
    "pop_cov",
    "pop_uncov",
    "per_cov",
    "per_uncov",
];

fn record_properties(record: &CoverageRecord) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("key".to_string(), record.key.clone().into());
    properties.insert("pop_tot".to_string(), record.stats.pop_tot.into());
    properties.insert("pop_cov".to_string(), record.stats.pop_cov.into());
    properties.insert("pop_uncov".to_string(), record.stats.pop_uncov.into());
    properties.insert("per_cov".to_string(), record.stats.per_cov.into());
    properties.insert("per_uncov".to_string(), record.stats.per_uncov.into());
    properties
}

/// Converts a coverage table into a `GeoJSON` `FeatureCollection`.
#[must_use]
pub fn table_to_geojson(table: &CoverageTable) -> FeatureCollection {
    let features = table
        .records
        .iter()
        .map(|record| Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&record.geometry))),
            id: None,
            properties: Some(record_properties(record)),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Writes a coverage table as `GeoJSON`.
///
/// # Errors
///
/// Returns [`SourceError::Io`] or [`SourceError::Json`] if writing fails.
pub fn write_geojson<W: Write>(table: &CoverageTable, writer: W) -> Result<(), SourceError> {
    serde_json::to_writer(writer, &table_to_geojson(table))?;
    Ok(())
}

fn format_share(share: Option<f64>) -> String {
    share.map_or_else(String::new, |value| value.to_string())
}

fn csv_row(record: &CoverageRecord) -> [String; 6] {
    let CoverageStats {
        pop_tot,
        pop_cov,
        pop_uncov,
        per_cov,
        per_uncov,
    } = record.stats;

    [
        record.key.clone(),
        pop_tot.to_string(),
        pop_cov.to_string(),
        pop_uncov.to_string(),
        format_share(per_cov),
        format_share(per_uncov),
    ]
}

/// Writes a coverage table as CSV, one row per record in key order.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if writing fails.
pub fn write_csv<W: Write>(table: &CoverageTable, writer: W) -> Result<(), SourceError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for record in &table.records {
        writer.write_record(csv_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Run-level figures of a coverage report, written next to its tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary<'a> {
    /// Which invocation produced the report.
    pub key: &'a CoverageKey,
    /// Configuration the report was computed with.
    pub config: &'a CoverageConfig,
    /// Coverage over every input point.
    pub national: CoverageStats,
    /// Number of administrative regions reported.
    pub admin_regions: usize,
    /// Number of hex cells reported.
    pub hex_cells: usize,
    /// Points outside every administrative region.
    pub unassigned_points: usize,
    /// Population outside every administrative region.
    pub unassigned_population: f64,
}

impl<'a> From<&'a CoverageReport> for ReportSummary<'a> {
    fn from(report: &'a CoverageReport) -> Self {
        Self {
            key: &report.key,
            config: &report.config,
            national: report.national,
            admin_regions: report.admin.len(),
            hex_cells: report.hex.len(),
            unassigned_points: report.unassigned_points,
            unassigned_population: report.unassigned_population,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, SourceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes every output of a report into `output_dir` and returns the paths
/// written.
///
/// Files are named `{stem}-admin.geojson`, `{stem}-admin.csv`,
/// `{stem}-hex.geojson`, `{stem}-hex.csv` and `{stem}-summary.json`, where
/// `stem` is [`CoverageKey::file_stem`].
///
/// # Errors
///
/// Returns any I/O, CSV or JSON error from writing.
pub fn write_report(
    report: &CoverageReport,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, SourceError> {
    let stem = report.key.file_stem();
    let mut written = Vec::new();

    for table in [&report.admin, &report.hex] {
        let geojson_path = output_dir.join(format!("{stem}-{}.geojson", table.unit));
        let mut writer = create(&geojson_path)?;
        write_geojson(table, &mut writer)?;
        writer.flush()?;
        written.push(geojson_path);

        let csv_path = output_dir.join(format!("{stem}-{}.csv", table.unit));
        write_csv(table, create(&csv_path)?)?;
        written.push(csv_path);
    }

    let summary_path = output_dir.join(format!("{stem}-summary.json"));
    let mut writer = create(&summary_path)?;
    serde_json::to_writer_pretty(&mut writer, &ReportSummary::from(report))?;
    writer.flush()?;
    written.push(summary_path);

    log::info!(
        "Wrote {} files for {} to {}",
        written.len(),
        report.key,
        output_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use access_atlas_coverage_models::AggregationUnit;
    use geo::{MultiPolygon, Rect, coord};

    use super::*;

    fn table() -> CoverageTable {
        let square = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).to_polygon();
        CoverageTable {
            unit: AggregationUnit::Admin,
            records: vec![
                CoverageRecord {
                    key: "R1".to_string(),
                    stats: CoverageStats::from_totals(200.0, 50.0),
                    geometry: MultiPolygon(vec![square.clone()]),
                },
                CoverageRecord {
                    key: "R2".to_string(),
                    stats: CoverageStats::from_totals(0.0, 0.0),
                    geometry: MultiPolygon(vec![square]),
                },
            ],
        }
    }

    #[test]
    fn geojson_properties_mirror_the_table() {
        let mut buffer = Vec::new();
        write_geojson(&table(), &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let first = &features[0]["properties"];
        assert_eq!(first["key"], "R1");
        assert_eq!(first["pop_cov"], 50.0);
        assert_eq!(first["per_cov"], 25.0);
        assert_eq!(features[0]["geometry"]["type"], "MultiPolygon");

        let second = &features[1]["properties"];
        assert!(second["per_cov"].is_null());
        assert!(second["per_uncov"].is_null());
    }

    #[test]
    fn csv_leaves_undefined_shares_empty() {
        let mut buffer = Vec::new();
        write_csv(&table(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "key,pop_tot,pop_cov,pop_uncov,per_cov,per_uncov");
        assert_eq!(lines[1], "R1,200,50,150,25,75");
        assert_eq!(lines[2], "R2,0,0,0,,");
    }
}
