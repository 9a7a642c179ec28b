#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Binary entry point for the heritage map API server.

use std::process::ExitCode;

#[actix_web::main]
async fn main() -> ExitCode {
    match heritage_map_server::run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server stopped: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
