//! Importer Binary - load the municipality CSV with every write strategy
//!
//! Reads the source once, then for each selected strategy drops and recreates
//! the table (untimed) and times only the inserts.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin importer
//! cargo run --release --bin importer -- --strategy row,bulk --json
//! ```
//!
//! ## Environment Variables
//!
//! - DB_NAME - SQLite database path (default: municipios.db)
//! - DB_TABLE - Target table (default: municipios)
//! - SOURCE_PATH - CSV source (default: dados/ibge.csv)
//! - BATCH_SIZE - Split the batched strategy into commits of this many records
//!   (default: unset, the whole file is one batch)
//! - DB_NAME=:memory: works here but leaves nothing for `counter`/`homonyms`
//! - DB_HOST / DB_PORT / DB_USER / DB_PASSWORD - accepted and logged only
//! - RUST_LOG - Logging level (optional, default: info)

use municipios::config::{has_flag, parse_strategies_from_args};
use municipios::{harness, report, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    let strategies = parse_strategies_from_args(&args)?;

    log::info!("🚀 Starting importer");
    config.log_summary();
    log::info!(
        "   Strategies: {}",
        strategies.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    );

    let reports = harness::import_source(&config, &strategies)?;

    if has_flag(&args, "--json") {
        println!("{}", report::to_json(&reports)?);
    } else {
        for load in &reports {
            println!("{}", report::load_line(load));
        }
    }

    log::info!("✅ Import finished");
    Ok(())
}
