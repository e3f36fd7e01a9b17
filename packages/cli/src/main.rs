#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the estate-map engine.
//!
//! Loads a property CSV and an area `GeoJSON` file concurrently, then
//! prints JSON describing the dataset, its areas, or a single selection.
//! Set `RUST_LOG=info` to see ingestion progress and warnings.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use estate_map_analytics_models::AreaStatistics;
use estate_map_engine::{Engine, EngineConfig, SelectOutcome};
use estate_map_ingest::files::{read_boundary_features, read_property_rows};
use estate_map_ingest_models::IngestSummary;
use estate_map_selection::Mode;
use estate_map_style::PriceRange;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "estate_map_cli", about = "Real-estate map analytics")]
struct Cli {
    /// Property CSV file (header row required)
    #[arg(long)]
    properties: PathBuf,
    /// Area boundaries as a `GeoJSON` `FeatureCollection`
    #[arg(long)]
    boundaries: PathBuf,
    /// Engine configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dataset counts, price range and ingestion warnings
    Summary,
    /// Statistics for every area
    Areas,
    /// Select an area in area mode and print the selection
    Area {
        /// Area name
        name: String,
    },
    /// Select a property marker and print its detail panel
    Property {
        /// Property name
        name: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatasetSummary<'a> {
    property_count: usize,
    area_count: usize,
    price_range: Option<PriceRange>,
    properties: Option<&'a IngestSummary>,
    boundaries: Option<&'a IngestSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AreaReport<'a> {
    name: &'a str,
    statistics: Option<AreaStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = estate_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_str(&tokio::fs::read_to_string(path).await?)?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::new(config)?;

    let spinner = estate_map_cli_utils::spinner(&multi, "Loading datasets");
    let property_ticket = engine.begin_property_load();
    let boundary_ticket = engine.begin_boundary_load();

    let (rows, features) = tokio::join!(
        read_property_rows(&cli.properties),
        read_boundary_features(&cli.boundaries),
    );

    engine.complete_property_load(property_ticket, &rows?)?;
    engine.complete_boundary_load(boundary_ticket, features?)?;
    spinner.finish_and_clear();

    log::info!(
        "Loaded {} properties and {} areas",
        engine.properties().len(),
        engine.areas().len()
    );

    match cli.command {
        Commands::Summary => print_json(&DatasetSummary {
            property_count: engine.properties().len(),
            area_count: engine.areas().len(),
            price_range: engine.price_range(),
            properties: engine.property_summary(),
            boundaries: engine.boundary_summary(),
        })?,
        Commands::Areas => {
            let reports: Vec<AreaReport<'_>> = engine
                .areas()
                .iter()
                .map(|area| match engine.area_statistics_for(&area.name) {
                    Ok(statistics) => AreaReport {
                        name: &area.name,
                        statistics,
                        error: None,
                    },
                    Err(e) => AreaReport {
                        name: &area.name,
                        statistics: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect();
            print_json(&reports)?;
        }
        Commands::Area { name } => {
            engine.switch_mode(Mode::Area);
            match engine.select_area(&name) {
                SelectOutcome::UnknownArea => return Err(format!("Unknown area '{name}'").into()),
                SelectOutcome::Degraded { error } => {
                    log::warn!("Area '{name}' selected without statistics: {error}");
                }
                _ => {}
            }
            print_json(engine.selection())?;
        }
        Commands::Property { name } => {
            if engine.select_marker_by_name(&name) == SelectOutcome::UnknownProperty {
                return Err(format!("Unknown property '{name}'").into());
            }
            print_json(&engine.property_detail())?;
        }
    }

    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
