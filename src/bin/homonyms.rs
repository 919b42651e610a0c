//! Homonyms Binary - municipality names shared by more than one region
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin homonyms
//! cargo run --release --bin homonyms -- --json
//! ```
//!
//! Prints `<name> - <region codes> - <count>`, most repeated names first.

use municipios::config::has_flag;
use municipios::{harness, report, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::from_env()?;

    log::info!("🚀 Looking for repeated municipality names");
    config.log_summary();

    let timed = harness::homonyms_report(&config.store)?;
    if has_flag(&std::env::args().collect::<Vec<_>>(), "--json") {
        println!("{}", report::to_json(&timed.value)?);
    } else {
        report::print_homonyms(&timed.value, timed.elapsed);
    }

    log::info!("✅ {} repeated names", timed.value.len());
    Ok(())
}
