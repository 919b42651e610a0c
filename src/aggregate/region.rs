//! Population per region: total for one year and number of municipalities
//!
//! The client path groups in memory and the server path pushes a
//! `GROUP BY ... ORDER BY` down to SQLite. Both sort keys by byte order
//! (SQLite's BINARY collation), so their outputs compare equal.

use super::AggregateRow;
use crate::record::{Record, Year};
use crate::store::{SqliteEndpoint, StoreError};
use std::collections::HashMap;

/// Group in memory, then emit keys in ascending order
pub fn population_by_region_client(records: &[Record], year: Year) -> Vec<AggregateRow> {
    let mut groups: HashMap<&str, (u64, u64)> = HashMap::new();

    for record in records {
        let entry = groups.entry(record.region_code.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(record.population(year));
    }

    let mut rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(key, (count, total))| AggregateRow {
            key: key.to_string(),
            count,
            total,
        })
        .collect();

    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

/// Fetch every record through the endpoint and group client-side
pub fn population_by_region_fetched(
    endpoint: &SqliteEndpoint,
    year: Year,
) -> Result<Vec<AggregateRow>, StoreError> {
    let records = endpoint.fetch_all()?;
    log::info!("📥 Found {} records", records.len());
    Ok(population_by_region_client(&records, year))
}

/// One grouped and ordered query; rows are consumed as they stream back
pub fn population_by_region_server(
    endpoint: &SqliteEndpoint,
    year: Year,
) -> Result<Vec<AggregateRow>, StoreError> {
    let sql = format!(
        "SELECT region_code, COUNT(*), SUM({})
         FROM {}
         GROUP BY region_code
         ORDER BY region_code",
        year.column(),
        endpoint.table()
    );

    let mut stmt = endpoint.connection().prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let count: i64 = row.get(1)?;
        let total: i64 = row.get(2)?;
        out.push(AggregateRow {
            key: row.get(0)?,
            count: non_negative(count)?,
            total: non_negative(total)?,
        });
    }

    Ok(out)
}

pub(crate) fn non_negative(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value)
        .map_err(|_| StoreError::Serialization(format!("negative aggregate value {}", value)))
}
