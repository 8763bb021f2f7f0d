#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population coverage engine.
//!
//! Given a country's population points, the reachable area around a group
//! of amenities and the country's administrative regions, computes how
//! much of the population is covered, aggregated two ways: per
//! administrative region and per H3 hex cell. Both tables share the same
//! columns (`pop_tot`, `pop_cov`, `pop_uncov`, `per_cov`, `per_uncov`).
//!
//! The engine is a synchronous pure function over in-memory inputs. It
//! never touches the filesystem or the network, and it keeps no state
//! between invocations, so callers may run different keys in parallel.
//! Any error aborts the whole invocation; no partial tables are returned.

pub mod admin;
pub mod config;
mod domain;
pub mod hex;
pub mod overlay;
pub mod report;
pub mod validate;

use access_atlas_spatial::SpatialError;
use thiserror::Error;

pub use config::CoverageConfig;
pub use report::{CoverageInputs, CoverageReport, compute_coverage};

/// Errors that can occur during a coverage invocation.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// A required input is absent or empty for the requested key.
    #[error("Data not found: {what} for {key}")]
    DataNotFound {
        /// Which input is missing.
        what: String,
        /// The coverage key the input was requested for.
        key: String,
    },

    /// Geometry is invalid, unprojectable or in the wrong CRS.
    #[error("Geometry error: {message}")]
    Geometry {
        /// Description of what went wrong.
        message: String,
    },

    /// An input record lacks a required attribute or carries an
    /// unusable value.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },

    /// Engine configuration is invalid.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<SpatialError> for CoverageError {
    fn from(err: SpatialError) -> Self {
        match err {
            SpatialError::LatLng(_) => Self::Geometry {
                message: err.to_string(),
            },
            SpatialError::Resolution(_) => Self::Config {
                message: err.to_string(),
            },
        }
    }
}
