//! Run orchestration shared by the binaries
//!
//! Each strategy run and each report opens its own endpoint and releases it
//! on every exit path. Strategies run strictly one after another.

use crate::aggregate::{
    duplicate_names_server, population_by_region_fetched, population_by_region_server,
    AggregateRow, DuplicateName,
};
use crate::config::{Config, StoreConfig};
use crate::loader::{LoadReport, LoadStrategy, Loader};
use crate::record::{Record, Year};
use crate::source::{self, SourceError};
use crate::store::{SqliteEndpoint, StoreError};
use crate::timing::{measure, Timed};

#[derive(Debug)]
pub enum RunError {
    Source(SourceError),
    Store(StoreError),
}

impl From<SourceError> for RunError {
    fn from(err: SourceError) -> Self {
        RunError::Source(err)
    }
}

impl From<StoreError> for RunError {
    fn from(err: StoreError) -> Self {
        RunError::Store(err)
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Source(e) => write!(f, "Source error: {}", e),
            RunError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Source(e) => Some(e),
            RunError::Store(e) => Some(e),
        }
    }
}

/// Open, prepare the table (untimed), load (timed), close
pub fn run_strategy(
    store: &StoreConfig,
    records: &[Record],
    strategy: LoadStrategy,
    loader: &Loader,
) -> Result<LoadReport, StoreError> {
    let mut endpoint = SqliteEndpoint::open(store)?;
    endpoint.prepare_schema()?;

    let report = loader.load(&mut endpoint, records, strategy)?;

    let persisted = endpoint.count_rows()?;
    if persisted != records.len() as u64 {
        log::warn!(
            "⚠️  {} persisted {} rows for {} records",
            strategy.label(),
            persisted,
            records.len()
        );
    }

    endpoint.close()?;
    Ok(report)
}

/// Read the source once, then run every strategy against the same records
pub fn import_source(
    config: &Config,
    strategies: &[LoadStrategy],
) -> Result<Vec<LoadReport>, RunError> {
    let records = source::read_path(&config.source_path)?;
    let loader = Loader::with_batch_size(config.batch_size);

    if strategies.contains(&LoadStrategy::Batched) {
        match loader.batch_size() {
            Some(size) => log::info!("📦 Batched strategy commits every {} records", size),
            None => log::info!(
                "📦 Batched strategy sends {} records as one batch",
                records.len()
            ),
        }
    }

    let mut reports = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        reports.push(run_strategy(&config.store, &records, strategy, &loader)?);
    }

    Ok(reports)
}

/// Reports read data written by an earlier run, which an in-memory database cannot hold
fn open_for_report(store: &StoreConfig) -> Result<SqliteEndpoint, StoreError> {
    if store.is_in_memory() {
        return Err(StoreError::Connection(
            "reports need a database file; ':memory:' starts empty on every connection"
                .to_string(),
        ));
    }
    SqliteEndpoint::open(store)
}

/// Client-side path: the timed region covers fetching and grouping
pub fn region_report_client(
    store: &StoreConfig,
    year: Year,
) -> Result<Timed<Vec<AggregateRow>>, StoreError> {
    let endpoint = open_for_report(store)?;
    let timed = measure("client-side grouping", || {
        population_by_region_fetched(&endpoint, year)
    })
    .transpose()?;
    endpoint.close()?;
    Ok(timed)
}

pub fn region_report_server(
    store: &StoreConfig,
    year: Year,
) -> Result<Timed<Vec<AggregateRow>>, StoreError> {
    let endpoint = open_for_report(store)?;
    let timed = measure("server-side grouping", || {
        population_by_region_server(&endpoint, year)
    })
    .transpose()?;
    endpoint.close()?;
    Ok(timed)
}

pub fn homonyms_report(store: &StoreConfig) -> Result<Timed<Vec<DuplicateName>>, StoreError> {
    let endpoint = open_for_report(store)?;
    let timed = measure("duplicate names", || {
        duplicate_names_server(&endpoint)
    })
    .transpose()?;
    endpoint.close()?;
    Ok(timed)
}
