//! Municipality population bulk-load benchmark
//!
//! # Architecture
//!
//! ```text
//! CSV source → source::parse → Vec<Record>
//!     ↓ (same records for every strategy, run one after another)
//! loader::Loader::load(strategy) → SqliteEndpoint (drop + create untimed)
//!     ↓
//! aggregate (client-side grouping  ≡  server-side GROUP BY)
//!     ↓
//! report (console lines, JSON load summaries)
//! ```

pub mod aggregate;
pub mod config;
pub mod harness;
pub mod loader;
pub mod record;
pub mod report;
pub mod source;
pub mod sqlite_pragma;
pub mod store;
pub mod timing;

pub use aggregate::{AggregateRow, DuplicateName};
pub use config::{Config, ConfigError, StoreConfig};
pub use harness::RunError;
pub use loader::{load, LoadReport, LoadStrategy, Loader};
pub use record::{Record, Year};
pub use source::{MalformedRecordError, SourceError};
pub use store::{SqliteEndpoint, StoreError};
