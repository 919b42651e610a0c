use crate::record::Record;
use rusqlite::ErrorCode;

#[derive(Debug)]
pub enum StoreError {
    /// Endpoint could not be opened or configured
    Connection(String),
    /// Duplicate id or duplicate (name, region_code).
    /// `position` is 1-based within the input; both are unknown for multi-row inserts.
    ConstraintViolation {
        record_id: Option<u32>,
        position: Option<usize>,
        detail: String,
    },
    /// A value could not be bound to or read from its column
    Serialization(String),
    /// Statement or query rejected by the endpoint
    Query(String),
    /// Failure inside batch number `batch` (1-based)
    Batch { batch: usize, source: Box<StoreError> },
}

impl StoreError {
    /// Classify a failed insert of `record` at 1-based `position`
    pub fn from_insert(err: rusqlite::Error, record: &Record, position: usize) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::ConstraintViolation {
                    record_id: Some(record.id),
                    position: Some(position),
                    detail: msg.unwrap_or_else(|| e.to_string()),
                }
            }
            other => StoreError::from(other),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        match self {
            StoreError::ConstraintViolation { .. } => true,
            StoreError::Batch { source, .. } => source.is_constraint_violation(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::ConstraintViolation {
                    record_id: None,
                    position: None,
                    detail: msg.unwrap_or_else(|| e.to_string()),
                }
            }
            rusqlite::Error::SqliteFailure(e, msg)
                if matches!(
                    e.code,
                    ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied
                ) =>
            {
                StoreError::Connection(msg.unwrap_or_else(|| e.to_string()))
            }
            rusqlite::Error::ToSqlConversionFailure(e) => StoreError::Serialization(e.to_string()),
            e @ rusqlite::Error::IntegralValueOutOfRange(..)
            | e @ rusqlite::Error::FromSqlConversionFailure(..)
            | e @ rusqlite::Error::InvalidColumnType(..) => {
                StoreError::Serialization(e.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(e) => write!(f, "Connection error: {}", e),
            StoreError::ConstraintViolation {
                record_id,
                position,
                detail,
            } => {
                write!(f, "Constraint violation: {}", detail)?;
                if let Some(id) = record_id {
                    write!(f, " (record id {}", id)?;
                    if let Some(pos) = position {
                        write!(f, ", position {}", pos)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Query(e) => write!(f, "Query error: {}", e),
            StoreError::Batch { batch, source } => write!(f, "Batch {} failed: {}", batch, source),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Batch { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
