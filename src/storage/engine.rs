use bytes::Bytes;
use std::fmt::{Display, Formatter};

use crate::catalog::DataType;
use crate::error::QuillQueryResult;
use crate::expression::CompareOp;

/// Position of a record inside a relation. Only meaningful to the scan that
/// produced it, and only until that record is deleted.
#[derive(derive_new::new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: u32,
    pub slot_num: u32,
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.page_id, self.slot_num)
    }
}

/// Opaque token for an open scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanHandle(pub(crate) u32);

impl ScanHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Comparison a storage scan applies to each record: the `length` bytes at
/// `offset`, read as `data_type`, compared against `value` with `op`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanFilter<'a> {
    pub offset: usize,
    pub length: usize,
    pub data_type: DataType,
    pub value: Option<&'a [u8]>,
    pub op: CompareOp,
}

impl ScanFilter<'_> {
    /// Matches every record. Full scans go through the same filter path with this
    /// degenerate comparison.
    pub fn unconditional() -> Self {
        ScanFilter {
            offset: 0,
            length: 0,
            data_type: DataType::String,
            value: None,
            op: CompareOp::Eq,
        }
    }
}

/// Record-oriented heap storage the operators drive.
pub trait StorageEngine: Send + Sync {
    fn open_scan(&self, relation: &str) -> QuillQueryResult<ScanHandle>;

    /// Positions the scan before its first record and installs the filter.
    fn start_filter(&self, handle: ScanHandle, filter: &ScanFilter<'_>) -> QuillQueryResult<()>;

    /// The next matching record, or `None` once the scan is exhausted.
    fn next(&self, handle: ScanHandle) -> QuillQueryResult<Option<RecordId>>;

    /// Bytes of the record the scan is positioned on.
    fn fetch(&self, handle: ScanHandle, rid: RecordId) -> QuillQueryResult<Bytes>;

    fn delete_current(&self, handle: ScanHandle) -> QuillQueryResult<()>;

    /// Releases the handle. Closing an unknown handle is a no-op.
    fn close_scan(&self, handle: ScanHandle);

    fn insert_tuple(&self, relation: &str, data: &[u8]) -> QuillQueryResult<RecordId>;
}
