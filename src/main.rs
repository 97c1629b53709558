//! OpenAPI From Routes - command-line tool for generating OpenAPI documentation.
//!
//! The host application exports its route table (and optionally exact class
//! metadata); the tool reads it together with the application sources and
//! writes an OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes generate --routes routes.yaml --source ./app -o docs/openapi.json
//! ```
//!
//! Use the JSON:API response format and write YAML:
//! ```bash
//! openapi-from-routes generate -r routes.yaml -f json-api --output-format yaml -o openapi.yaml
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-routes -v generate -r routes.yaml
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("OpenAPI From Routes starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    Ok(())
}
