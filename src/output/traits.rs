//! Record sink trait and error types

use crate::record::CompanyRecord;
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Append-only destination for completed records
///
/// Implementations must not reorder or coalesce records, and must make
/// each record durable before returning from `append`.
pub trait RecordSink: Send {
    fn append(&mut self, record: &CompanyRecord) -> SinkResult<()>;
}
