//! SQLite storage endpoint for the municipios table
//!
//! One endpoint wraps one connection. It is opened before each strategy run or
//! report and closed when it goes out of scope; `close()` exists for callers
//! that want close failures reported instead of swallowed by `Drop`.

use super::error::StoreError;
use crate::config::StoreConfig;
use crate::record::{Record, Year};
use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{Connection, Row, ToSql};
use std::path::Path;

/// Bound parameters per record in every insert statement
pub const COLUMNS_PER_ROW: usize = 7;

pub const COLUMN_LIST: &str =
    "id, name, region_code, population_2018, population_2019, population_2020, population_2021";

pub struct SqliteEndpoint {
    conn: Connection,
    table: String,
}

impl SqliteEndpoint {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        config
            .validate()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if !config.is_in_memory() {
            log::debug!(
                "Ignoring network settings for SQLite endpoint ({}@{}:{})",
                config.user,
                config.host,
                config.port
            );
        }

        let opened = if config.is_in_memory() {
            Connection::open_in_memory()
        } else {
            // Ensure parent directory exists
            if let Some(parent) = Path::new(&config.database).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Connection(format!(
                            "Failed to create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
            Connection::open(&config.database)
        };
        let conn =
            opened.map_err(|e| StoreError::Connection(format!("{}: {}", config.database, e)))?;

        apply_optimized_pragmas(&conn)
            .map_err(|e| StoreError::Connection(format!("{}: {}", config.database, e)))?;

        log::debug!("🔌 Connected to {}", config.database);

        Ok(Self {
            conn,
            table: config.table_name.clone(),
        })
    }

    /// Private in-memory database configured the same way as `open`
    pub fn open_in_memory(table: &str) -> Result<Self, StoreError> {
        Self::open(&StoreConfig {
            table_name: table.to_string(),
            ..StoreConfig::with_database(":memory:")
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Drop the table if it exists, then create it empty.
    ///
    /// Runs before timing starts for every strategy.
    pub fn prepare_schema(&self) -> Result<(), StoreError> {
        log::info!("🗑️  Dropping table {}", self.table);
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", self.table))?;

        log::info!("🔧 Creating table {}", self.table);
        self.conn.execute_batch(&format!(
            "CREATE TABLE {} (
                id INTEGER NOT NULL PRIMARY KEY,
                name TEXT NOT NULL,
                region_code TEXT NOT NULL,
                population_2018 INTEGER NOT NULL,
                population_2019 INTEGER NOT NULL,
                population_2020 INTEGER NOT NULL,
                population_2021 INTEGER NOT NULL,
                UNIQUE (name, region_code)
            )",
            self.table
        ))?;

        Ok(())
    }

    /// Single-row insert statement, `?1..?7` in `COLUMN_LIST` order
    pub fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            self.table, COLUMN_LIST
        )
    }

    /// Multi-row insert statement for `rows` records
    pub fn multi_insert_sql(&self, rows: usize) -> String {
        let placeholders = vec!["(?, ?, ?, ?, ?, ?, ?)"; rows].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table, COLUMN_LIST, placeholders
        )
    }

    pub fn count_rows(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Read every persisted record back, ordered by id
    pub fn fetch_all(&self) -> Result<Vec<Record>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            COLUMN_LIST, self.table
        ))?;

        let rows = stmt.query_map([], record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        log::debug!("📥 Fetched {} records from {}", records.len(), self.table);
        Ok(records)
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_, e)| StoreError::Connection(format!("close failed: {}", e)))
    }
}

/// Bind order matches `COLUMN_LIST`
pub fn record_values(record: &Record) -> [&dyn ToSql; COLUMNS_PER_ROW] {
    [
        &record.id,
        &record.name,
        &record.region_code,
        &record.population[0],
        &record.population[1],
        &record.population[2],
        &record.population[3],
    ]
}

pub fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let mut population = [0u32; 4];
    for (i, year) in Year::all().iter().enumerate() {
        population[i] = row.get(year.column())?;
    }

    Ok(Record {
        id: row.get("id")?,
        name: row.get("name")?,
        region_code: row.get("region_code")?,
        population,
    })
}
