#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line explorer for Europeana data providers.
//!
//! Fetches one provider's geolocated records, attributes each to a
//! country, and prints a summary. With no subcommand it runs an
//! interactive prompt loop.
//!
//! Uses `indicatif-log-bridge` (via [`heritage_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the fetch spinner never fight for the terminal.

mod interactive;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use heritage_map_explorer::{ExploreError, Explorer, ExplorerSettings};

#[derive(Parser)]
#[command(name = "heritage_map", about = "Europeana data provider explorer")]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// `GeoJSON` `FeatureCollection` of country polygons
    #[arg(long, global = true)]
    countries: Option<PathBuf>,
    /// Feature property holding the country name (default: name, NAME, ADMIN, `name_long`)
    #[arg(long, global = true)]
    name_property: Option<String>,
    /// Maximum number of records to request
    #[arg(long, global = true)]
    rows: Option<u32>,
    /// Directory for CSV and `GeoJSON` exports
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a provider's records and attribute them to countries
    Fetch {
        /// Exact data provider name (e.g., "Rijksmuseum")
        provider: String,
        /// Print the report without writing export files
        #[arg(long)]
        no_export: bool,
    },
    /// List the country names in the reference dataset
    Countries,
}

impl Cli {
    /// Settings file overlaid with command-line flags.
    fn settings(&self) -> Result<ExplorerSettings, ExploreError> {
        let mut settings = ExplorerSettings::load(self.config.as_deref())?;

        if let Some(path) = &self.countries {
            settings.countries_path = Some(path.clone());
        }
        if let Some(property) = &self.name_property {
            settings.country_name_property = Some(property.clone());
        }
        if let Some(rows) = self.rows {
            settings.rows = rows;
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir.clone_from(dir);
        }

        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = heritage_map_cli_utils::init_logger();
    let cli = Cli::parse();

    match run(&cli, &multi).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ExploreError>() {
                Some(err) => eprintln!("{}", report::render_error(err)),
                None => eprintln!("Error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: &Cli,
    multi: &heritage_map_cli_utils::MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = cli.settings()?;

    match &cli.command {
        Some(Commands::Countries) => list_countries(&settings),
        Some(Commands::Fetch {
            provider,
            no_export,
        }) => {
            let explorer = build_explorer(&settings)?;

            let bar = heritage_map_cli_utils::spinner(multi, "Fetching data...");
            let result = explorer.explore(provider, settings.rows).await;
            bar.finish_and_clear();

            let exploration = result?;
            print!("{}", report::render_exploration(&exploration));

            if !no_export {
                for path in exploration.write_exports(&settings.output_dir)? {
                    println!("Wrote {}", path.display());
                }
            }
            Ok(())
        }
        None => {
            let explorer = build_explorer(&settings)?;
            interactive::run(multi, &explorer, settings.rows, &settings.output_dir).await
        }
    }
}

// A missing API key stops here, before any request is made.
fn build_explorer(settings: &ExplorerSettings) -> Result<Explorer, ExploreError> {
    let explorer = Explorer::from_settings(settings)?;
    log::info!(
        "Reference dataset has {} countries",
        explorer.index().len()
    );
    Ok(explorer)
}

fn list_countries(settings: &ExplorerSettings) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &settings.countries_path else {
        return Err("No country dataset configured (use --countries or countries_path)".into());
    };

    let countries = heritage_map_spatial::load_countries(
        path,
        settings.country_name_property.as_deref(),
    )
    .map_err(ExploreError::from)?;

    for country in &countries {
        println!("{}", country.name);
    }
    println!();
    println!("{} countries", countries.len());

    Ok(())
}
