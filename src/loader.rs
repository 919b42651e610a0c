//! Load strategies for persisting a record set through a storage endpoint
//!
//! A single `Loader::load` is parameterised by `LoadStrategy`:
//!
//! | Strategy         | Unit of commit        | On failure                          |
//! |------------------|-----------------------|-------------------------------------|
//! | `RowAtATime`     | each insert           | rows before the failing one remain  |
//! | `Transactional`  | whole record set      | nothing persisted                   |
//! | `Batched`        | each batch            | earlier batches remain              |
//! | `BulkCollection` | whole record set      | nothing persisted                   |
//!
//! Without an explicit batch size the batched strategy submits the whole record
//! set as one batch, so a failure anywhere persists nothing.
//!
//! Only the persistence calls are timed. Schema preparation is the caller's
//! job and happens before `load`.

use crate::record::Record;
use crate::store::{record_values, SqliteEndpoint, StoreError, COLUMNS_PER_ROW};
use crate::timing::measure;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ToSql};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Bound-parameter ceiling for one statement (SQLite's historical default)
const MAX_BOUND_PARAMS: usize = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    RowAtATime,
    Transactional,
    Batched,
    BulkCollection,
}

impl LoadStrategy {
    pub fn all() -> [LoadStrategy; 4] {
        [
            LoadStrategy::RowAtATime,
            LoadStrategy::Transactional,
            LoadStrategy::Batched,
            LoadStrategy::BulkCollection,
        ]
    }

    /// Short name accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStrategy::RowAtATime => "row",
            LoadStrategy::Transactional => "transaction",
            LoadStrategy::Batched => "batch",
            LoadStrategy::BulkCollection => "bulk",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadStrategy::RowAtATime => "row-at-a-time (auto-commit)",
            LoadStrategy::Transactional => "single transaction",
            LoadStrategy::Batched => "batched",
            LoadStrategy::BulkCollection => "bulk collection insert",
        }
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for LoadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "row" | "row-at-a-time" | "autocommit" => Ok(LoadStrategy::RowAtATime),
            "transaction" | "transactional" | "tx" => Ok(LoadStrategy::Transactional),
            "batch" | "batched" => Ok(LoadStrategy::Batched),
            "bulk" | "bulk-collection" => Ok(LoadStrategy::BulkCollection),
            other => Err(format!(
                "unknown strategy '{}' (expected row, transaction, batch or bulk)",
                other
            )),
        }
    }
}

/// Outcome of one successful strategy run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub strategy: LoadStrategy,
    pub rows_written: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

fn serialize_millis<S: Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// Batched mode sends one batch covering every record unless `batch_size` is set
#[derive(Debug, Clone, Default)]
pub struct Loader {
    batch_size: Option<usize>,
}

impl Loader {
    /// Split batched loads into runs of `batch_size` records, each its own commit
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size.max(1)),
        }
    }

    pub fn with_batch_size(batch_size: Option<usize>) -> Self {
        batch_size.map(Self::new).unwrap_or_default()
    }

    /// `None` means the whole record set is one batch
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    /// Persist `records` into the endpoint's table using `strategy`
    pub fn load(
        &self,
        endpoint: &mut SqliteEndpoint,
        records: &[Record],
        strategy: LoadStrategy,
    ) -> Result<LoadReport, StoreError> {
        log::info!("📤 Importing {} records ({})", records.len(), strategy.label());

        let started_at = Utc::now();
        let timed = measure(strategy.label(), || match strategy {
            LoadStrategy::RowAtATime => insert_row_at_a_time(endpoint, records),
            LoadStrategy::Transactional => insert_transactional(endpoint, records),
            LoadStrategy::Batched => insert_batched(endpoint, records, self.batch_size),
            LoadStrategy::BulkCollection => insert_bulk(endpoint, records),
        });

        let rows_written = timed.value?;

        log::info!(
            "✅ {} rows written with {} in {:?}",
            rows_written,
            strategy.label(),
            timed.elapsed
        );

        Ok(LoadReport {
            strategy,
            rows_written,
            elapsed: timed.elapsed,
            started_at,
        })
    }
}

/// Load with a default `Loader` (batched mode sends a single batch)
pub fn load(
    endpoint: &mut SqliteEndpoint,
    records: &[Record],
    strategy: LoadStrategy,
) -> Result<LoadReport, StoreError> {
    Loader::default().load(endpoint, records, strategy)
}

/// Insert one record per statement; `offset` shifts reported positions
fn insert_each(
    conn: &Connection,
    sql: &str,
    records: &[Record],
    offset: usize,
) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare_cached(sql)?;

    for (i, record) in records.iter().enumerate() {
        stmt.execute(&record_values(record)[..])
            .map_err(|e| StoreError::from_insert(e, record, offset + i + 1))?;
    }

    Ok(records.len())
}

/// All of `records` commit together or not at all
fn insert_in_transaction(
    conn: &mut Connection,
    sql: &str,
    records: &[Record],
    offset: usize,
) -> Result<usize, StoreError> {
    let tx = conn.transaction()?;
    let written = insert_each(&tx, sql, records, offset)?;
    tx.commit()?;
    Ok(written)
}

fn insert_row_at_a_time(
    endpoint: &SqliteEndpoint,
    records: &[Record],
) -> Result<usize, StoreError> {
    // Connection stays in auto-commit mode: every execute is its own commit
    insert_each(endpoint.connection(), &endpoint.insert_sql(), records, 0)
}

fn insert_transactional(
    endpoint: &mut SqliteEndpoint,
    records: &[Record],
) -> Result<usize, StoreError> {
    let sql = endpoint.insert_sql();
    insert_in_transaction(endpoint.connection_mut(), &sql, records, 0)
}

fn insert_batched(
    endpoint: &mut SqliteEndpoint,
    records: &[Record],
    batch_size: Option<usize>,
) -> Result<usize, StoreError> {
    let batch_size = batch_size.unwrap_or(records.len()).max(1);
    let sql = endpoint.insert_sql();
    let conn = endpoint.connection_mut();
    let mut written = 0;

    for (idx, batch) in records.chunks(batch_size).enumerate() {
        written += insert_in_transaction(conn, &sql, batch, idx * batch_size).map_err(|e| {
            StoreError::Batch {
                batch: idx + 1,
                source: Box::new(e),
            }
        })?;

        log::debug!("✅ Flushed batch {} ({} records)", idx + 1, batch.len());
    }

    Ok(written)
}

fn insert_bulk(endpoint: &mut SqliteEndpoint, records: &[Record]) -> Result<usize, StoreError> {
    let rows_per_statement = MAX_BOUND_PARAMS / COLUMNS_PER_ROW;
    let full_sql = endpoint.multi_insert_sql(rows_per_statement);
    let tail_sql = endpoint.multi_insert_sql((records.len() % rows_per_statement).max(1));

    let tx = endpoint.connection_mut().transaction()?;

    for chunk in records.chunks(rows_per_statement) {
        let sql = if chunk.len() == rows_per_statement {
            &full_sql
        } else {
            &tail_sql
        };

        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(chunk.len() * COLUMNS_PER_ROW);
        for record in chunk {
            values.extend(record_values(record));
        }

        tx.prepare_cached(sql)?.execute(&values[..])?;
    }

    tx.commit()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: u32) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new(i, format!("Municipio {}", i), "SP", [i, i + 1, i + 2, i + 3]))
            .collect()
    }

    fn endpoint() -> SqliteEndpoint {
        let endpoint = SqliteEndpoint::open_in_memory("municipios").unwrap();
        endpoint.prepare_schema().unwrap();
        endpoint
    }

    #[test]
    fn test_strategy_parsing() {
        for strategy in LoadStrategy::all() {
            assert_eq!(strategy.as_str().parse::<LoadStrategy>().unwrap(), strategy);
        }
        assert_eq!(
            "Transactional".parse::<LoadStrategy>().unwrap(),
            LoadStrategy::Transactional
        );
        assert!("copy".parse::<LoadStrategy>().is_err());
    }

    #[test]
    fn test_every_strategy_writes_all_rows() {
        let input = records(500);

        for strategy in LoadStrategy::all() {
            let mut endpoint = endpoint();
            let report = Loader::new(64).load(&mut endpoint, &input, strategy).unwrap();

            assert_eq!(report.strategy, strategy);
            assert_eq!(report.rows_written, 500);
            assert_eq!(endpoint.count_rows().unwrap(), 500, "{}", strategy);
        }
    }

    #[test]
    fn test_empty_input() {
        for strategy in LoadStrategy::all() {
            let mut endpoint = endpoint();
            let report = load(&mut endpoint, &[], strategy).unwrap();
            assert_eq!(report.rows_written, 0);
            assert_eq!(endpoint.count_rows().unwrap(), 0);
        }
    }

    #[test]
    fn test_bulk_handles_exact_statement_multiple() {
        let rows_per_statement = MAX_BOUND_PARAMS / COLUMNS_PER_ROW;
        let input = records((rows_per_statement * 2) as u32);

        let mut endpoint = endpoint();
        load(&mut endpoint, &input, LoadStrategy::BulkCollection).unwrap();
        assert_eq!(endpoint.count_rows().unwrap(), input.len() as u64);
    }

    #[test]
    fn test_row_at_a_time_reports_failing_position() {
        let mut input = records(5);
        input[3].id = 2; // duplicate primary key at position 4

        let mut endpoint = endpoint();
        let err = load(&mut endpoint, &input, LoadStrategy::RowAtATime).unwrap_err();

        match err {
            StoreError::ConstraintViolation { record_id, position, .. } => {
                assert_eq!(record_id, Some(2));
                assert_eq!(position, Some(4));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(endpoint.count_rows().unwrap(), 3);
    }

    #[test]
    fn test_batched_failure_names_batch() {
        let mut input = records(10);
        input[7].id = 1; // lands in the third batch of 3

        let mut endpoint = endpoint();
        let err = Loader::new(3)
            .load(&mut endpoint, &input, LoadStrategy::Batched)
            .unwrap_err();

        match &err {
            StoreError::Batch { batch, source } => {
                assert_eq!(*batch, 3);
                assert!(matches!(
                    source.as_ref(),
                    StoreError::ConstraintViolation { position: Some(8), .. }
                ));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(endpoint.count_rows().unwrap(), 6);
    }

    #[test]
    fn test_default_batched_load_is_one_batch() {
        let mut input = records(1500);
        input[1199].name = input[0].name.clone(); // duplicate (name, region_code) at position 1200

        let loader = Loader::default();
        assert_eq!(loader.batch_size(), None);

        let mut endpoint = endpoint();
        let err = loader
            .load(&mut endpoint, &input, LoadStrategy::Batched)
            .unwrap_err();

        match &err {
            StoreError::Batch { batch, source } => {
                assert_eq!(*batch, 1);
                assert!(matches!(
                    source.as_ref(),
                    StoreError::ConstraintViolation { position: Some(1200), .. }
                ));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(endpoint.count_rows().unwrap(), 0);
    }

    #[test]
    fn test_with_batch_size() {
        assert_eq!(Loader::with_batch_size(None).batch_size(), None);
        assert_eq!(Loader::with_batch_size(Some(0)).batch_size(), Some(1));
        assert_eq!(Loader::with_batch_size(Some(250)).batch_size(), Some(250));
    }

    #[test]
    fn test_report_serializes_elapsed_millis() {
        let mut endpoint = endpoint();
        let report = load(&mut endpoint, &records(3), LoadStrategy::Transactional).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "transactional");
        assert_eq!(json["rows_written"], 3);
        assert!(json["elapsed_ms"].as_f64().unwrap() >= 0.0);
        assert!(json["started_at"].is_string());
    }
}
