//! Data directory layout.
//!
//! ```text
//! {root}/population/{popgroup}/{ISO}_{popgroup}.csv.gz
//! {root}/isochrones/{amenity}/{group}/{minute}-min/{ISO}-{profile}-{minute}.geojson
//! {root}/boundaries/level-{n}/{iso}-level-{n}.geojson
//! ```

use std::path::{Path, PathBuf};

use access_atlas_coverage_models::{AdminLevel, CoverageKey, PopulationGroup};

/// Resolves input file paths under a data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Population CSV for a country and population group. Prefers the
    /// gzipped file and falls back to plain CSV when only that exists.
    #[must_use]
    pub fn population_path(&self, iso3: &str, popgroup: PopulationGroup) -> PathBuf {
        let dir = self.root.join("population").join(popgroup.as_ref());
        let gz = dir.join(format!("{iso3}_{popgroup}.csv.gz"));
        if gz.exists() {
            return gz;
        }
        let plain = dir.join(format!("{iso3}_{popgroup}.csv"));
        if plain.exists() { plain } else { gz }
    }

    /// Isochrone union for a coverage key.
    #[must_use]
    pub fn isochrone_path(&self, key: &CoverageKey) -> PathBuf {
        self.root
            .join("isochrones")
            .join(key.amenity.as_ref())
            .join(key.group.as_ref())
            .join(format!("{}-min", key.minute))
            .join(format!("{}-{}-{}.geojson", key.country, key.profile, key.minute))
    }

    /// Boundary file for a country at an admin level.
    #[must_use]
    pub fn boundary_path(&self, iso3: &str, level: AdminLevel) -> PathBuf {
        let n = level.value();
        self.root
            .join("boundaries")
            .join(format!("level-{n}"))
            .join(format!("{}-level-{n}.geojson", iso3.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use access_atlas_coverage_models::{Amenity, FacilityGroup, TravelProfile};

    use super::*;

    #[test]
    fn isochrone_paths_follow_the_key() {
        let layout = DataLayout::new("data");
        let key = CoverageKey {
            country: "PER".to_string(),
            amenity: Amenity::Financial,
            profile: TravelProfile::Driving,
            minute: 30,
            group: FacilityGroup::Public,
            popgroup: PopulationGroup::Women,
        };

        assert_eq!(
            layout.isochrone_path(&key),
            Path::new("data/isochrones/financial/public/30-min/PER-driving-30.geojson")
        );
    }

    #[test]
    fn boundary_paths_use_lowercase_codes() {
        let layout = DataLayout::new("data");
        assert_eq!(
            layout.boundary_path("JAM", AdminLevel::Admin1),
            Path::new("data/boundaries/level-1/jam-level-1.geojson")
        );
    }

    #[test]
    fn missing_population_defaults_to_gzip_path() {
        let layout = DataLayout::new("does-not-exist");
        assert_eq!(
            layout.population_path("COL", PopulationGroup::ChildrenUnderFive),
            Path::new("does-not-exist/population/children_under_five")
                .join("COL_children_under_five.csv.gz")
        );
    }
}
