//! Aggregation engine
//!
//! Every report has a client-side path (group records in memory) and a
//! server-side path (one grouped query against the endpoint). For the same
//! data both paths return the same rows in the same order.

pub mod homonyms;
pub mod region;

use serde::Serialize;

pub use homonyms::{duplicate_names_client, duplicate_names_server};
pub use region::{
    population_by_region_client, population_by_region_fetched, population_by_region_server,
};

/// `(key, count, total)` for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub count: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    pub name: String,
    /// Comma-joined, ascending
    pub region_codes: String,
    pub count: u64,
}
