#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line runner for population coverage.
//!
//! Loads a country's population grid and boundaries once, then runs one
//! coverage invocation per requested travel-time threshold and writes the
//! admin and hex tables for each. Invocations run one after another; any
//! error stops the run.

mod config;

use std::path::PathBuf;

use access_atlas_coverage::{CoverageInputs, compute_coverage};
use access_atlas_coverage_models::{
    Amenity, CoverageKey, FacilityGroup, PopulationGroup, TravelProfile,
};
use access_atlas_source::boundary::load_boundaries;
use access_atlas_source::export::write_report;
use access_atlas_source::isochrone::load_isochrone;
use access_atlas_source::layout::DataLayout;
use access_atlas_source::population::load_population;
use access_atlas_source::registry::{all_countries, find_country};
use clap::{Args, Parser, Subcommand};

use crate::config::AtlasConfig;

#[derive(Parser)]
#[command(name = "access_atlas", about = "Population coverage within amenity isochrones")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute admin and hex coverage for one country and amenity
    Coverage(CoverageArgs),
    /// List the supported countries
    Countries,
}

#[derive(Args)]
struct CoverageArgs {
    /// ISO alpha-3 or alpha-2 country code
    #[arg(long)]
    country: String,

    /// Amenity category
    #[arg(long, default_value_t = Amenity::Healthcare)]
    amenity: Amenity,

    /// Routing profile
    #[arg(long, default_value_t = TravelProfile::Walking)]
    profile: TravelProfile,

    /// Travel-time thresholds in minutes
    #[arg(long, required = true, num_args = 1..)]
    minute: Vec<u16>,

    /// Facility record group
    #[arg(long, default_value_t = FacilityGroup::Official)]
    group: FacilityGroup,

    /// Population group
    #[arg(long, default_value_t = PopulationGroup::TotalPopulation)]
    popgroup: PopulationGroup,

    /// Configuration file (defaults to `access_atlas.toml` if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Overrides the configured output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Coverage(args) => run_coverage(args)?,
        Commands::Countries => list_countries(),
    }

    Ok(())
}

fn run_coverage(args: CoverageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AtlasConfig::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let country = find_country(&args.country)?;
    let layout = DataLayout::new(&config.data_dir);
    log::info!(
        "Running {} ({}) at {} from {}",
        country.name,
        country.iso3,
        country.admin_level,
        layout.root().display()
    );

    let population = load_population(&layout.population_path(&country.iso3, args.popgroup))?;
    let regions = load_boundaries(
        &layout.boundary_path(&country.iso3, country.admin_level),
        &country,
    )?;

    let mut minutes = args.minute;
    minutes.sort_unstable();
    minutes.dedup();

    let mut previous: Option<(u16, f64)> = None;
    for minute in minutes {
        let key = CoverageKey {
            country: country.iso3.clone(),
            amenity: args.amenity,
            profile: args.profile,
            minute,
            group: args.group,
            popgroup: args.popgroup,
        };

        let isochrone = load_isochrone(&layout.isochrone_path(&key))?;
        let inputs = CoverageInputs {
            key: &key,
            population: &population,
            isochrone: isochrone.as_ref(),
            regions: &regions,
        };
        let report = compute_coverage(&inputs, &config.coverage)?;

        if let Some((previous_minute, previous_covered)) = previous
            && report.national.pop_cov < previous_covered
        {
            log::warn!(
                "{key}: covered population dropped from {previous_covered:.0} \
                 at {previous_minute} min to {:.0}",
                report.national.pop_cov
            );
        }
        previous = Some((minute, report.national.pop_cov));

        write_report(&report, &config.output_dir)?;
    }

    Ok(())
}

fn list_countries() {
    println!("{:<5} {:<4} {:<8} NAME", "ISO3", "ISO2", "LEVEL");
    for country in all_countries() {
        println!(
            "{:<5} {:<4} {:<8} {}",
            country.iso3,
            country.iso2,
            country.admin_level.to_string(),
            country.name
        );
    }
}
