//! Interactive explorer loop.
//!
//! Prompts for a provider name, fetches and attributes its records under
//! a spinner, prints the report, and offers to write the exports. Fetch
//! failures are shown as warnings and the loop continues.

use std::path::Path;

use dialoguer::{Confirm, Input};
use heritage_map_cli_utils::{MultiProgress, spinner};
use heritage_map_explorer::Explorer;

use crate::report;

/// Runs the prompt loop until the user declines another search.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails or the explorer hits a
/// blocking (configuration) error.
pub async fn run(
    multi: &MultiProgress,
    explorer: &Explorer,
    rows: u32,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Europeana Data Explorer");
    println!();

    loop {
        let provider_name: String = Input::new()
            .with_prompt("Enter the name of the data provider")
            .allow_empty(true)
            .interact_text()?;

        if provider_name.trim().is_empty() {
            println!("Warning: Please enter a provider name.");
            continue;
        }

        let bar = spinner(multi, "Fetching data...");
        let result = explorer.explore(&provider_name, rows).await;
        bar.finish_and_clear();

        match result {
            Ok(exploration) => {
                println!();
                print!("{}", report::render_exploration(&exploration));
                println!();

                if !exploration.records.is_empty()
                    && Confirm::new()
                        .with_prompt("Download full dataset as CSV and GeoJSON?")
                        .default(true)
                        .interact()?
                {
                    match exploration.write_exports(output_dir) {
                        Ok(paths) => {
                            for path in paths {
                                println!("Wrote {}", path.display());
                            }
                        }
                        Err(e) => println!("{}", report::render_error(&e)),
                    }
                }
            }
            Err(e) => {
                println!("{}", report::render_error(&e));
                if report::severity(&e) == report::Severity::Blocking {
                    return Err(e.into());
                }
            }
        }

        println!();
        if !Confirm::new()
            .with_prompt("Explore another provider?")
            .default(true)
            .interact()?
        {
            return Ok(());
        }
    }
}

