#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population, isochrone, region and coverage record types.
//!
//! These types describe the inputs and outputs of a single coverage
//! invocation: a set of weighted population points, the union of the
//! reachable area around a group of amenities, the administrative regions
//! of a country, and the resulting per-region and per-hex coverage tables.
//! They carry no I/O and no configuration.

use std::fmt;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A population estimate located at a single coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationPoint {
    /// Latitude in WGS84 degrees.
    pub latitude: f64,
    /// Longitude in WGS84 degrees.
    pub longitude: f64,
    /// Estimated number of people at this point. Never negative.
    pub population: f64,
}

impl PopulationPoint {
    /// Creates a new population point.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, population: f64) -> Self {
        Self {
            latitude,
            longitude,
            population,
        }
    }
}

/// The union of every facility isochrone for a single coverage key.
///
/// Parts may overlap; per-facility identity is not retained.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneGeometry {
    /// Reachable area in WGS84 longitude/latitude.
    pub geometry: MultiPolygon<f64>,
}

impl IsochroneGeometry {
    /// Wraps an already-unioned reachable area.
    #[must_use]
    pub const fn new(geometry: MultiPolygon<f64>) -> Self {
        Self { geometry }
    }

    /// Returns `true` when the isochrone covers no area at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }
}

impl Default for IsochroneGeometry {
    fn default() -> Self {
        Self::new(MultiPolygon(vec![]))
    }
}

/// An administrative region at the aggregation level of its country.
#[derive(Debug, Clone, PartialEq)]
pub struct AdministrativeRegion {
    /// Region P-code (e.g. `"CO05001"`).
    pub code: String,
    /// Region boundary in WGS84 longitude/latitude.
    pub boundary: MultiPolygon<f64>,
}

impl AdministrativeRegion {
    /// Creates a region from its code and boundary.
    #[must_use]
    pub fn new(code: impl Into<String>, boundary: MultiPolygon<f64>) -> Self {
        Self {
            code: code.into(),
            boundary,
        }
    }
}

/// Administrative subdivision level used as the aggregation key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdminLevel {
    /// First-level subdivision (state, province, parish).
    Admin1,
    /// Second-level subdivision (municipality, district).
    #[default]
    Admin2,
}

impl AdminLevel {
    /// Returns the numeric level (`1` or `2`).
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Admin1 => 1,
            Self::Admin2 => 2,
        }
    }

    /// Name of the boundary attribute holding the region P-code at this
    /// level (e.g. `"ADM2_PCODE"`).
    #[must_use]
    pub const fn pcode_field(self) -> &'static str {
        match self {
            Self::Admin1 => "ADM1_PCODE",
            Self::Admin2 => "ADM2_PCODE",
        }
    }
}

impl From<AdminLevel> for u8 {
    fn from(level: AdminLevel) -> Self {
        level.value()
    }
}

impl TryFrom<u8> for AdminLevel {
    type Error = InvalidAdminLevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Admin1),
            2 => Ok(Self::Admin2),
            _ => Err(InvalidAdminLevelError(value)),
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "admin-{}", self.value())
    }
}

/// Error returned when an admin level outside `1..=2` is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAdminLevelError(pub u8);

impl fmt::Display for InvalidAdminLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported admin level {} (expected 1 or 2)", self.0)
    }
}

impl std::error::Error for InvalidAdminLevelError {}

/// Amenity category whose facilities produced the isochrones.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Amenity {
    /// Banks, ATMs and other financial access points.
    Financial,
    /// Hospitals, clinics and health posts.
    Healthcare,
}

/// Routing profile used to generate the isochrones.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TravelProfile {
    /// On foot.
    Walking,
    /// By bicycle.
    Cycling,
    /// By car.
    Driving,
}

/// Which facility records the isochrones were built from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacilityGroup {
    /// Official government registries.
    Official,
    /// Crowd-sourced public records.
    Public,
}

/// Demographic slice of the gridded population estimates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PopulationGroup {
    /// Everyone.
    #[default]
    TotalPopulation,
    /// Women of all ages.
    Women,
    /// Men of all ages.
    Men,
    /// Children under five.
    ChildrenUnderFive,
    /// Youth aged 15 to 24.
    #[strum(serialize = "youth_15_24")]
    #[serde(rename = "youth_15_24")]
    Youth15To24,
    /// Elderly aged 60 and over.
    #[strum(serialize = "elderly_60_plus")]
    #[serde(rename = "elderly_60_plus")]
    Elderly60Plus,
    /// Women aged 15 to 49.
    #[strum(serialize = "women_of_reproductive_age_15_49")]
    #[serde(rename = "women_of_reproductive_age_15_49")]
    WomenOfReproductiveAge15To49,
}

/// Uniquely identifies one coverage invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverageKey {
    /// ISO 3166-1 alpha-3 country code (e.g. `"COL"`).
    pub country: String,
    /// Amenity category.
    pub amenity: Amenity,
    /// Routing profile.
    pub profile: TravelProfile,
    /// Travel-time threshold in minutes.
    pub minute: u16,
    /// Facility record group.
    pub group: FacilityGroup,
    /// Population group.
    pub popgroup: PopulationGroup,
}

impl CoverageKey {
    /// Stem used for per-key output files, e.g.
    /// `"COL-healthcare-official-walking-15-total_population"`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}",
            self.country, self.amenity, self.group, self.profile, self.minute, self.popgroup
        )
    }
}

impl fmt::Display for CoverageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {} {}min ({})",
            self.country, self.amenity, self.group, self.profile, self.minute, self.popgroup
        )
    }
}

/// Which spatial unit a coverage table is keyed by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregationUnit {
    /// Administrative regions keyed by P-code.
    Admin,
    /// H3 cells keyed by hex index.
    Hex,
}

/// Population totals and coverage shares for one spatial unit.
///
/// `per_cov` and `per_uncov` are `None` when `pop_tot` is zero: the share
/// is undefined and is reported as `null`, never as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Total population.
    pub pop_tot: f64,
    /// Population inside the isochrone.
    pub pop_cov: f64,
    /// Population outside the isochrone.
    pub pop_uncov: f64,
    /// Percentage covered, `0..=100`.
    pub per_cov: Option<f64>,
    /// Percentage not covered, `0..=100`.
    pub per_uncov: Option<f64>,
}

impl CoverageStats {
    /// Derives the uncovered population and both percentages from the
    /// total and covered population.
    #[must_use]
    pub fn from_totals(pop_tot: f64, pop_cov: f64) -> Self {
        let pop_uncov = pop_tot - pop_cov;
        let (per_cov, per_uncov) = if pop_tot.is_finite() && pop_tot > 0.0 {
            (
                Some(pop_cov * 100.0 / pop_tot),
                Some(pop_uncov * 100.0 / pop_tot),
            )
        } else {
            (None, None)
        };

        Self {
            pop_tot,
            pop_cov,
            pop_uncov,
            per_cov,
            per_uncov,
        }
    }
}

/// One row of a coverage table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRecord {
    /// Region P-code or hex index.
    pub key: String,
    /// Population and coverage figures.
    pub stats: CoverageStats,
    /// Region boundary or hex cell outline.
    pub geometry: MultiPolygon<f64>,
}

/// A full coverage table for one aggregation unit, ordered by key.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTable {
    /// Spatial unit the rows are keyed by.
    pub unit: AggregationUnit,
    /// Rows in ascending key order.
    pub records: Vec<CoverageRecord>,
}

impl CoverageTable {
    /// Sums every row into a single set of figures for the whole table.
    #[must_use]
    pub fn summary(&self) -> CoverageStats {
        let (pop_tot, pop_cov) = self
            .records
            .iter()
            .fold((0.0, 0.0), |(tot, cov), record| {
                (tot + record.stats.pop_tot, cov + record.stats.pop_cov)
            });
        CoverageStats::from_totals(pop_tot, pop_cov)
    }

    /// Looks up a row by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CoverageRecord> {
        self.records
            .binary_search_by(|record| record.key.as_str().cmp(key))
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn stats_split_population_into_percentages() {
        let stats = CoverageStats::from_totals(600.0, 300.0);
        assert!((stats.pop_uncov - 300.0).abs() < f64::EPSILON);
        assert_eq!(stats.per_cov, Some(50.0));
        assert_eq!(stats.per_uncov, Some(50.0));
    }

    #[test]
    fn zero_population_has_no_percentages() {
        let stats = CoverageStats::from_totals(0.0, 0.0);
        assert_eq!(stats.per_cov, None);
        assert_eq!(stats.per_uncov, None);
        assert!(stats.pop_uncov.abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_totals_have_no_percentages() {
        let stats = CoverageStats::from_totals(f64::INFINITY, 1e308);
        assert_eq!(stats.per_cov, None);
        assert_eq!(stats.per_uncov, None);

        let stats = CoverageStats::from_totals(f64::NAN, 0.0);
        assert_eq!(stats.per_cov, None);
    }

    #[test]
    fn default_isochrone_is_empty() {
        let isochrone = IsochroneGeometry::default();
        assert!(isochrone.is_empty());
        assert_eq!(isochrone, IsochroneGeometry::new(MultiPolygon(vec![])));
    }

    #[test]
    fn null_percentages_serialize_as_null() {
        let json = serde_json::to_value(CoverageStats::from_totals(0.0, 0.0)).unwrap();
        assert!(json["per_cov"].is_null());
        assert!(json["per_uncov"].is_null());
        assert_eq!(json["pop_tot"], serde_json::json!(0.0));
    }

    #[test]
    fn population_groups_round_trip_through_strings() {
        for name in [
            "total_population",
            "women",
            "men",
            "children_under_five",
            "youth_15_24",
            "elderly_60_plus",
            "women_of_reproductive_age_15_49",
        ] {
            let group = PopulationGroup::from_str(name).unwrap();
            assert_eq!(group.to_string(), name);
        }
    }

    #[test]
    fn admin_level_rejects_unknown_levels() {
        assert_eq!(AdminLevel::try_from(1), Ok(AdminLevel::Admin1));
        assert_eq!(AdminLevel::try_from(3), Err(InvalidAdminLevelError(3)));
        assert_eq!(AdminLevel::Admin2.pcode_field(), "ADM2_PCODE");
    }

    #[test]
    fn key_file_stem_lists_every_component() {
        let key = CoverageKey {
            country: "COL".to_string(),
            amenity: Amenity::Healthcare,
            profile: TravelProfile::Walking,
            minute: 15,
            group: FacilityGroup::Official,
            popgroup: PopulationGroup::Youth15To24,
        };
        assert_eq!(
            key.file_stem(),
            "COL-healthcare-official-walking-15-youth_15_24"
        );
    }

    #[test]
    fn table_lookup_uses_key_order() {
        let table = CoverageTable {
            unit: AggregationUnit::Admin,
            records: ["A", "B", "C"]
                .into_iter()
                .map(|key| CoverageRecord {
                    key: key.to_string(),
                    stats: CoverageStats::from_totals(10.0, 5.0),
                    geometry: MultiPolygon(vec![]),
                })
                .collect(),
        };
        assert!(table.get("B").is_some());
        assert!(table.get("D").is_none());
        assert_eq!(table.summary().per_cov, Some(50.0));
    }
}
