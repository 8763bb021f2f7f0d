#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Local data loaders and exporters for the coverage pipeline.
//!
//! Reads already-downloaded population grids, isochrone unions and
//! administrative boundaries from a data directory and turns them into the
//! in-memory types the coverage engine accepts. Writes the resulting
//! coverage tables back out as `GeoJSON` and CSV.
//!
//! Per-country special cases (which admin level to aggregate to, which
//! `ADM0_PCODE` a boundary file uses) live in the embedded country table
//! in [`registry`], not in branching code.

pub mod boundary;
pub mod export;
pub mod isochrone;
pub mod layout;
pub mod population;
pub mod registry;

use std::path::PathBuf;

use access_atlas_coverage_models::AdminLevel;
use serde::Deserialize;

/// Errors that can occur while loading or writing pipeline data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `GeoJSON` parsing or conversion failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// A required input file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that was expected.
        path: PathBuf,
    },

    /// A record lacks a required attribute.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },

    /// The country code is not in the country table.
    #[error("Unknown country: {code}")]
    UnknownCountry {
        /// The code that was looked up.
        code: String,
    },
}

/// A country the pipeline runs for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-3 code (e.g. `"COL"`).
    pub iso3: String,
    /// ISO 3166-1 alpha-2 code (e.g. `"CO"`).
    pub iso2: String,
    /// English name.
    pub name: String,
    /// Boundary level coverage is aggregated to.
    pub admin_level: AdminLevel,
}

impl Country {
    /// Whether an `ADM0_PCODE` value refers to this country. Boundary
    /// files use either the alpha-2 or the alpha-3 code.
    #[must_use]
    pub fn matches_pcode(&self, pcode: &str) -> bool {
        let pcode = pcode.trim();
        pcode.eq_ignore_ascii_case(&self.iso3) || pcode.eq_ignore_ascii_case(&self.iso2)
    }
}
