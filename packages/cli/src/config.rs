//! Runner configuration loaded from `access_atlas.toml`.
//!
//! ```toml
//! data_dir = "data"
//! output_dir = "data/coverage"
//!
//! [coverage]
//! hex_resolution = 6
//! generalize_meters = 500
//! ```

use std::path::{Path, PathBuf};

use access_atlas_coverage::CoverageConfig;
use serde::Deserialize;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "access_atlas.toml";

/// Directories and engine parameters for a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Root of the input data layout.
    pub data_dir: PathBuf,
    /// Where coverage tables are written.
    pub output_dir: PathBuf,
    /// Engine parameters.
    pub coverage: CoverageConfig,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("data/coverage"),
            coverage: CoverageConfig::default(),
        }
    }
}

impl AtlasConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the engine parameters
    /// are out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(content)?;
        config.coverage.validate()?;
        Ok(config)
    }

    /// Loads the configuration from `path`, or from
    /// [`DEFAULT_CONFIG_PATH`] when no path is given. A missing default
    /// file yields the defaults; a missing explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    log::debug!("No {DEFAULT_CONFIG_PATH}, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        log::info!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(AtlasConfig::from_toml_str("").unwrap(), AtlasConfig::default());
    }

    #[test]
    fn partial_coverage_table_keeps_other_defaults() {
        let config = AtlasConfig::from_toml_str(
            "output_dir = \"out\"\n\n[coverage]\nhex_resolution = 7\n",
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.coverage.hex_resolution, 7);
        assert_eq!(config.coverage.generalize_meters, 500);
    }

    #[test]
    fn rejects_out_of_range_resolution() {
        assert!(AtlasConfig::from_toml_str("[coverage]\nhex_resolution = 16\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AtlasConfig::load(Some(Path::new("no/such/access_atlas.toml"))).is_err());
    }
}
