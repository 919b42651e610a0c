//! Storage endpoint: connection scope, schema preparation and row codec

pub mod endpoint;
pub mod error;

pub use endpoint::{record_from_row, record_values, SqliteEndpoint, COLUMNS_PER_ROW};
pub use error::StoreError;
