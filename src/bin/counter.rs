//! Counter Binary - population per region, grouped client-side and server-side
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin counter -- --year 2020
//! cargo run --release --bin counter -- --json
//! ```
//!
//! ## Environment Variables
//!
//! - DB_NAME - SQLite database file (default: municipios.db; `:memory:` is rejected)
//! - DB_TABLE - Source table (default: municipios)
//! - REPORT_YEAR - Population year to sum (default: 2021)
//! - RUST_LOG - Logging level (optional, default: info)
//!
//! A failing report is logged and the next one still runs.

use municipios::config::{has_flag, parse_year_from_args};
use municipios::{harness, report, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    let year = parse_year_from_args(&args, config.year)?;
    let json = has_flag(&args, "--json");

    log::info!("🚀 Starting counter for {}", year);
    config.log_summary();

    let client = match harness::region_report_client(&config.store, year) {
        Ok(timed) => {
            if json {
                println!("{}", report::to_json(&timed.value)?);
            } else {
                report::print_regions(&timed.value, timed.elapsed);
            }
            Some(timed.value)
        }
        Err(e) => {
            log::error!("❌ Client-side report failed: {}", e);
            None
        }
    };

    let server = match harness::region_report_server(&config.store, year) {
        Ok(timed) => {
            if json {
                println!("{}", report::to_json(&timed.value)?);
            } else {
                report::print_regions(&timed.value, timed.elapsed);
            }
            Some(timed.value)
        }
        Err(e) => {
            log::error!("❌ Server-side report failed: {}", e);
            None
        }
    };

    match (client, server) {
        (Some(client), Some(server)) if client == server => {
            log::info!("✅ Client-side and server-side results match ({} regions)", server.len());
        }
        (Some(_), Some(_)) => {
            return Err("client-side and server-side aggregation disagree".into());
        }
        _ => return Err("at least one report failed".into()),
    }

    Ok(())
}
