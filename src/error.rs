use thiserror::Error;

pub type QuillQueryResult<T, E = QuillQueryError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum QuillQueryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Insufficient memory: {0}")]
    InsufficientMemory(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Not support: {0}")]
    NotSupport(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Failures raised by a heap storage engine. Operators pass these through unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("relation {0} does not exist")]
    UnknownRelation(String),

    #[error("relation {0} already exists")]
    RelationExists(String),

    #[error("no free scan handle, {0} scans already open")]
    ScanPoolExhausted(usize),

    #[error("scan handle {0} is not open")]
    InvalidHandle(u32),

    #[error("scan {0} has not been started")]
    ScanNotStarted(u32),

    #[error("scan {0} is not positioned on a record")]
    NoCurrentRecord(u32),

    #[error("record {0} is not the current record of the scan")]
    StaleRecord(String),

    #[error("bad scan parameter: {0}")]
    BadScanParameter(String),

    #[error("record length {actual} does not match relation record length {expected}")]
    RecordLength { expected: usize, actual: usize },

    #[error("relation {relation} is full at {capacity} records")]
    RelationFull { relation: String, capacity: usize },
}

impl From<std::collections::TryReserveError> for QuillQueryError {
    fn from(value: std::collections::TryReserveError) -> Self {
        QuillQueryError::InsufficientMemory(value.to_string())
    }
}
