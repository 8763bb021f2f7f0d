//! Engine configuration.

use access_atlas_spatial::hex::HexGrid;
use serde::{Deserialize, Serialize};

use crate::CoverageError;

/// H3 resolution used for the hex coverage table. Resolution 6 cells
/// (~36 km²) smooth the population grid while still separating towns.
pub const DEFAULT_HEX_RESOLUTION: u8 = 6;

/// Douglas-Peucker tolerance, in meters, the isochrones were generalized with.
pub const DEFAULT_GENERALIZE_METERS: u32 = 500;

/// Parameters of a coverage invocation that are not part of its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// H3 resolution of the hex coverage table (`0..=15`).
    pub hex_resolution: u8,
    /// Generalization tolerance of the input isochrones, in meters.
    ///
    /// The engine does not re-simplify geometry; the value is carried into
    /// the report so outputs record how their isochrones were produced.
    pub generalize_meters: u32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            hex_resolution: DEFAULT_HEX_RESOLUTION,
            generalize_meters: DEFAULT_GENERALIZE_METERS,
        }
    }
}

impl CoverageConfig {
    /// Parses a configuration from TOML. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError::Config`] if the TOML is malformed or the
    /// values are out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, CoverageError> {
        let config: Self = toml::from_str(content).map_err(|e| CoverageError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError::Config`] for an out-of-range hex resolution.
    pub fn validate(&self) -> Result<(), CoverageError> {
        self.hex_grid().map(|_| ())
    }

    /// Builds the hex grid for the configured resolution.
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError::Config`] for an out-of-range hex resolution.
    pub fn hex_grid(&self) -> Result<HexGrid, CoverageError> {
        Ok(HexGrid::new(self.hex_resolution)?)
    }
}
