use log::trace;

use crate::catalog::{AttributeDescriptor, DataType};
use crate::config::ParseMode;
use crate::error::{QuillQueryError, QuillQueryResult};
use crate::expression::CompareOp;
use crate::storage::codec::ValueCodec;
use crate::storage::tuple::Tuple;
use crate::storage::{RecordId, ScanFilter, ScanHandle, StorageEngine};

/// A single attribute comparison, already encoded in the stored representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPredicate {
    pub offset: usize,
    pub length: usize,
    pub data_type: DataType,
    pub op: CompareOp,
    pub value: Vec<u8>,
}

impl ScanPredicate {
    /// Encodes `raw` with the attribute's stored type and length. The type a caller
    /// declared for the constant plays no part.
    pub fn for_attribute(
        attr: &AttributeDescriptor,
        op: CompareOp,
        raw: &[u8],
        mode: ParseMode,
    ) -> QuillQueryResult<Self> {
        let value = ValueCodec::encode(raw, attr.data_type, attr.length, mode)?;
        Ok(Self {
            offset: attr.offset,
            length: attr.length,
            data_type: attr.data_type,
            op,
            value,
        })
    }

    pub fn as_filter(&self) -> ScanFilter<'_> {
        ScanFilter {
            offset: self.offset,
            length: self.length,
            data_type: self.data_type,
            value: Some(&self.value),
            op: self.op,
        }
    }
}

/// An open storage scan. The handle is released when the driver is closed or
/// dropped, whichever comes first, so early returns cannot leak it.
pub struct PredicateScan<'a> {
    storage: &'a dyn StorageEngine,
    relation: String,
    handle: Option<ScanHandle>,
    current: Option<RecordId>,
}

impl<'a> PredicateScan<'a> {
    pub fn open(
        storage: &'a dyn StorageEngine,
        relation: &str,
        predicate: Option<&ScanPredicate>,
    ) -> QuillQueryResult<Self> {
        let handle = storage.open_scan(relation)?;
        // built before the filter starts so a rejected filter still closes the handle
        let scan = Self {
            storage,
            relation: relation.to_string(),
            handle: Some(handle),
            current: None,
        };
        let filter = predicate
            .map(ScanPredicate::as_filter)
            .unwrap_or_else(ScanFilter::unconditional);
        storage.start_filter(handle, &filter)?;
        trace!(
            "scan {} on {} started, filtered: {}",
            handle.id(),
            relation,
            predicate.is_some()
        );
        Ok(scan)
    }

    /// Advances to the next matching record. `None` means the scan is exhausted.
    pub fn next_rid(&mut self) -> QuillQueryResult<Option<RecordId>> {
        let handle = self.handle()?;
        self.current = None;
        let rid = self.storage.next(handle)?;
        self.current = rid;
        Ok(rid)
    }

    /// Bytes of the record the last `next_rid` stopped on.
    pub fn current(&self) -> QuillQueryResult<Tuple> {
        let handle = self.handle()?;
        let rid = self.current.ok_or_else(|| {
            QuillQueryError::Internal(format!("scan on {} has no current record", self.relation))
        })?;
        let bytes = self.storage.fetch(handle, rid)?;
        Ok(Tuple::from_bytes(bytes.to_vec()))
    }

    pub fn delete_current(&mut self) -> QuillQueryResult<()> {
        let handle = self.handle()?;
        let rid = self.current.take().ok_or_else(|| {
            QuillQueryError::Internal(format!("scan on {} has no current record", self.relation))
        })?;
        trace!("delete {} from {}", rid, self.relation);
        self.storage.delete_current(handle)
    }

    pub fn close(mut self) {
        self.release();
    }

    fn handle(&self) -> QuillQueryResult<ScanHandle> {
        self.handle.ok_or_else(|| {
            QuillQueryError::Internal(format!("scan on {} is closed", self.relation))
        })
    }

    fn release(&mut self) {
        self.current = None;
        if let Some(handle) = self.handle.take() {
            self.storage.close_scan(handle);
        }
    }
}

impl Drop for PredicateScan<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PredicateScan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateScan")
            .field("relation", &self.relation)
            .field("handle", &self.handle)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{PredicateScan, ScanPredicate};
    use crate::catalog::{AttributeDescriptor, DataType};
    use crate::config::ParseMode;
    use crate::error::{QuillQueryError, StorageError};
    use crate::expression::CompareOp;
    use crate::storage::{MemoryHeap, StorageEngine};

    fn heap() -> MemoryHeap {
        let heap = MemoryHeap::default();
        heap.create_relation("pets", 10).unwrap();
        for (id, name) in [(1i32, "cat"), (2, "dog"), (3, "eel")] {
            let mut record = id.to_ne_bytes().to_vec();
            let mut text = [0u8; 6];
            text[..3].copy_from_slice(name.as_bytes());
            record.extend_from_slice(&text);
            heap.insert_tuple("pets", &record).unwrap();
        }
        heap
    }

    fn name_attr() -> AttributeDescriptor {
        AttributeDescriptor::new("pets".into(), "name".into(), 4, 6, DataType::String)
    }

    #[test]
    fn predicate_uses_stored_encoding() {
        let id = AttributeDescriptor::new("pets".into(), "id".into(), 0, 4, DataType::Integer);
        let predicate =
            ScanPredicate::for_attribute(&id, CompareOp::Gt, b"2", ParseMode::Lenient).unwrap();
        assert_eq!(predicate.value, 2i32.to_ne_bytes().to_vec());
        assert_eq!(predicate.data_type, DataType::Integer);
        assert_eq!((predicate.offset, predicate.length), (0, 4));

        let name = ScanPredicate::for_attribute(&name_attr(), CompareOp::Eq, b"dog", ParseMode::Lenient)
            .unwrap();
        assert_eq!(name.value, b"dog\0\0\0".to_vec());
    }

    #[test]
    fn filtered_scan_yields_matches() {
        let heap = heap();
        let predicate =
            ScanPredicate::for_attribute(&name_attr(), CompareOp::Eq, b"dog", ParseMode::Lenient)
                .unwrap();
        let mut scan = PredicateScan::open(&heap, "pets", Some(&predicate)).unwrap();
        assert!(scan.next_rid().unwrap().is_some());
        let tuple = scan.current().unwrap();
        assert_eq!(&tuple.as_bytes()[..4], &2i32.to_ne_bytes());
        assert!(scan.next_rid().unwrap().is_none());
        scan.close();
        assert_eq!(heap.open_scan_count(), 0);
    }

    #[test]
    fn current_requires_positioned_scan() {
        let heap = heap();
        let mut scan = PredicateScan::open(&heap, "pets", None).unwrap();
        assert!(matches!(scan.current(), Err(QuillQueryError::Internal(_))));
        while scan.next_rid().unwrap().is_some() {}
        assert!(matches!(scan.current(), Err(QuillQueryError::Internal(_))));
        assert!(matches!(
            scan.delete_current(),
            Err(QuillQueryError::Internal(_))
        ));
    }

    #[test]
    fn drop_releases_handle() {
        let heap = heap();
        {
            let mut scan = PredicateScan::open(&heap, "pets", None).unwrap();
            scan.next_rid().unwrap();
            assert_eq!(heap.open_scan_count(), 1);
        }
        assert_eq!(heap.open_scan_count(), 0);
    }

    #[test]
    fn rejected_filter_releases_handle() {
        let heap = heap();
        let bogus = ScanPredicate {
            offset: 8,
            length: 4,
            data_type: DataType::Integer,
            op: CompareOp::Eq,
            value: 1i32.to_ne_bytes().to_vec(),
        };
        let err = PredicateScan::open(&heap, "pets", Some(&bogus)).unwrap_err();
        assert!(matches!(
            err,
            QuillQueryError::Storage(StorageError::BadScanParameter(_))
        ));
        assert_eq!(heap.open_scan_count(), 0);
    }

    #[test]
    fn delete_through_scan() {
        let heap = heap();
        let mut scan = PredicateScan::open(&heap, "pets", None).unwrap();
        while scan.next_rid().unwrap().is_some() {
            scan.delete_current().unwrap();
        }
        drop(scan);
        assert_eq!(heap.record_count("pets").unwrap(), 0);
    }
}
