use bytes::Bytes;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::catalog::DataType;
use crate::config::HeapConfig;
use crate::error::{QuillQueryResult, StorageError};
use crate::expression::CompareOp;
use crate::storage::comparator::compare_attribute;
use crate::storage::engine::{RecordId, ScanFilter, ScanHandle, StorageEngine};

#[derive(Debug)]
struct HeapRelation {
    record_len: usize,
    slots: Vec<Option<Bytes>>,
    live: usize,
}

#[derive(Debug)]
struct OwnedFilter {
    offset: usize,
    length: usize,
    data_type: DataType,
    value: Vec<u8>,
    op: CompareOp,
}

impl OwnedFilter {
    fn matches(&self, record: &[u8]) -> QuillQueryResult<bool> {
        let stored = &record[self.offset..self.offset + self.length];
        let ordering = compare_attribute(self.data_type, stored, &self.value)?;
        Ok(self.op.evaluate(ordering))
    }
}

#[derive(Debug)]
struct ScanState {
    relation: String,
    started: bool,
    filter: Option<OwnedFilter>,
    // slots at or past `bound` were appended after the filter started
    bound: usize,
    cursor: usize,
    current: Option<usize>,
}

#[derive(Debug, Default)]
struct HeapState {
    relations: HashMap<String, HeapRelation>,
    scans: HashMap<u32, ScanState>,
    next_handle: u32,
}

/// Heap storage kept in memory. Records live in append-only slot vectors; deletion
/// empties a slot without moving anything else.
#[derive(Debug)]
pub struct MemoryHeap {
    config: HeapConfig,
    state: Mutex<HeapState>,
}

impl MemoryHeap {
    pub fn new(config: HeapConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HeapState::default()),
        }
    }

    pub fn create_relation(&self, relation: &str, record_len: usize) -> QuillQueryResult<()> {
        let mut state = self.state.lock();
        if state.relations.contains_key(relation) {
            return Err(StorageError::RelationExists(relation.to_string()).into());
        }
        state.relations.insert(
            relation.to_string(),
            HeapRelation {
                record_len,
                slots: Vec::new(),
                live: 0,
            },
        );
        debug!("heap: created {} with {} byte records", relation, record_len);
        Ok(())
    }

    pub fn drop_relation(&self, relation: &str) -> QuillQueryResult<()> {
        let mut state = self.state.lock();
        if state.scans.values().any(|scan| scan.relation == relation) {
            return Err(StorageError::BadScanParameter(format!(
                "relation {relation} has open scans"
            ))
            .into());
        }
        state
            .relations
            .remove(relation)
            .map(|_| ())
            .ok_or_else(|| StorageError::UnknownRelation(relation.to_string()).into())
    }

    pub fn record_count(&self, relation: &str) -> QuillQueryResult<usize> {
        let state = self.state.lock();
        let rel = lookup(&state.relations, relation)?;
        Ok(rel.live)
    }

    pub fn record_len(&self, relation: &str) -> QuillQueryResult<usize> {
        let state = self.state.lock();
        Ok(lookup(&state.relations, relation)?.record_len)
    }

    /// Live records in slot order.
    pub fn records(&self, relation: &str) -> QuillQueryResult<Vec<Bytes>> {
        let state = self.state.lock();
        let rel = lookup(&state.relations, relation)?;
        Ok(rel.slots.iter().flatten().cloned().collect())
    }

    pub fn open_scan_count(&self) -> usize {
        self.state.lock().scans.len()
    }

    fn record_id(&self, slot: usize) -> RecordId {
        let per_page = self.config.records_per_page.max(1) as usize;
        RecordId::new((slot / per_page) as u32, (slot % per_page) as u32)
    }
}

impl Default for MemoryHeap {
    fn default() -> Self {
        Self::new(HeapConfig::default())
    }
}

fn lookup<'a>(
    relations: &'a HashMap<String, HeapRelation>,
    relation: &str,
) -> Result<&'a HeapRelation, StorageError> {
    relations
        .get(relation)
        .ok_or_else(|| StorageError::UnknownRelation(relation.to_string()))
}

fn validate_filter(filter: &ScanFilter<'_>, record_len: usize) -> Result<(), StorageError> {
    let Some(value) = filter.value else {
        return Ok(());
    };
    let end = filter.offset.checked_add(filter.length);
    if filter.length == 0 || end.map_or(true, |end| end > record_len) {
        return Err(StorageError::BadScanParameter(format!(
            "range of {} bytes at {} does not fit a {record_len} byte record",
            filter.length, filter.offset
        )));
    }
    if let Some(width) = filter.data_type.fixed_width() {
        if filter.length != width || value.len() != width {
            return Err(StorageError::BadScanParameter(format!(
                "{} filter needs {width} bytes, got attribute {} and value {}",
                filter.data_type,
                filter.length,
                value.len()
            )));
        }
    } else if value.is_empty() {
        return Err(StorageError::BadScanParameter(
            "empty STRING filter value".to_string(),
        ));
    }
    Ok(())
}

impl StorageEngine for MemoryHeap {
    fn open_scan(&self, relation: &str) -> QuillQueryResult<ScanHandle> {
        let mut state = self.state.lock();
        lookup(&state.relations, relation)?;
        if state.scans.len() >= self.config.max_open_scans {
            warn!("heap: scan pool exhausted opening {}", relation);
            return Err(StorageError::ScanPoolExhausted(state.scans.len()).into());
        }
        let mut id = state.next_handle;
        while state.scans.contains_key(&id) {
            id = id.wrapping_add(1);
        }
        state.next_handle = id.wrapping_add(1);
        state.scans.insert(
            id,
            ScanState {
                relation: relation.to_string(),
                started: false,
                filter: None,
                bound: 0,
                cursor: 0,
                current: None,
            },
        );
        trace!("heap: open scan {} on {}", id, relation);
        Ok(ScanHandle(id))
    }

    fn start_filter(&self, handle: ScanHandle, filter: &ScanFilter<'_>) -> QuillQueryResult<()> {
        let mut guard = self.state.lock();
        let HeapState {
            relations, scans, ..
        } = &mut *guard;
        let scan = scans
            .get_mut(&handle.0)
            .ok_or(StorageError::InvalidHandle(handle.0))?;
        let rel = lookup(relations, &scan.relation)?;
        validate_filter(filter, rel.record_len)?;

        scan.filter = filter.value.map(|value| OwnedFilter {
            offset: filter.offset,
            length: filter.length,
            data_type: filter.data_type,
            value: value.to_vec(),
            op: filter.op,
        });
        scan.started = true;
        scan.bound = rel.slots.len();
        scan.cursor = 0;
        scan.current = None;
        Ok(())
    }

    fn next(&self, handle: ScanHandle) -> QuillQueryResult<Option<RecordId>> {
        let mut guard = self.state.lock();
        let HeapState {
            relations, scans, ..
        } = &mut *guard;
        let scan = scans
            .get_mut(&handle.0)
            .ok_or(StorageError::InvalidHandle(handle.0))?;
        if !scan.started {
            return Err(StorageError::ScanNotStarted(handle.0).into());
        }
        let rel = lookup(relations, &scan.relation)?;

        while scan.cursor < scan.bound {
            let slot = scan.cursor;
            scan.cursor += 1;
            let Some(Some(record)) = rel.slots.get(slot) else {
                continue;
            };
            let matched = match &scan.filter {
                Some(filter) => filter.matches(record)?,
                None => true,
            };
            if matched {
                scan.current = Some(slot);
                return Ok(Some(self.record_id(slot)));
            }
        }
        scan.current = None;
        Ok(None)
    }

    fn fetch(&self, handle: ScanHandle, rid: RecordId) -> QuillQueryResult<Bytes> {
        let state = self.state.lock();
        let scan = state
            .scans
            .get(&handle.0)
            .ok_or(StorageError::InvalidHandle(handle.0))?;
        let slot = scan.current.ok_or(StorageError::NoCurrentRecord(handle.0))?;
        if self.record_id(slot) != rid {
            return Err(StorageError::StaleRecord(rid.to_string()).into());
        }
        let rel = lookup(&state.relations, &scan.relation)?;
        rel.slots
            .get(slot)
            .cloned()
            .flatten()
            .ok_or_else(|| StorageError::NoCurrentRecord(handle.0).into())
    }

    fn delete_current(&self, handle: ScanHandle) -> QuillQueryResult<()> {
        let mut guard = self.state.lock();
        let HeapState {
            relations, scans, ..
        } = &mut *guard;
        let scan = scans
            .get_mut(&handle.0)
            .ok_or(StorageError::InvalidHandle(handle.0))?;
        let slot = scan
            .current
            .take()
            .ok_or(StorageError::NoCurrentRecord(handle.0))?;
        let rel = relations
            .get_mut(&scan.relation)
            .ok_or_else(|| StorageError::UnknownRelation(scan.relation.clone()))?;
        match rel.slots.get_mut(slot) {
            Some(entry @ Some(_)) => {
                *entry = None;
                rel.live -= 1;
                Ok(())
            }
            _ => Err(StorageError::NoCurrentRecord(handle.0).into()),
        }
    }

    fn close_scan(&self, handle: ScanHandle) {
        if self.state.lock().scans.remove(&handle.0).is_none() {
            warn!("heap: close of unknown scan {}", handle.0);
        } else {
            trace!("heap: closed scan {}", handle.0);
        }
    }

    fn insert_tuple(&self, relation: &str, data: &[u8]) -> QuillQueryResult<RecordId> {
        let mut state = self.state.lock();
        let rel = state
            .relations
            .get_mut(relation)
            .ok_or_else(|| StorageError::UnknownRelation(relation.to_string()))?;
        if data.len() != rel.record_len {
            return Err(StorageError::RecordLength {
                expected: rel.record_len,
                actual: data.len(),
            }
            .into());
        }
        if let Some(capacity) = self.config.max_records_per_relation {
            if rel.live >= capacity {
                return Err(StorageError::RelationFull {
                    relation: relation.to_string(),
                    capacity,
                }
                .into());
            }
        }
        rel.slots.push(Some(Bytes::copy_from_slice(data)));
        rel.live += 1;
        let slot = rel.slots.len() - 1;
        Ok(self.record_id(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryHeap;
    use crate::catalog::DataType;
    use crate::config::HeapConfig;
    use crate::error::{QuillQueryError, StorageError};
    use crate::expression::CompareOp;
    use crate::storage::engine::{RecordId, ScanFilter, StorageEngine};

    fn heap_with_ints(values: &[i32]) -> MemoryHeap {
        let heap = MemoryHeap::new(HeapConfig {
            records_per_page: 2,
            ..HeapConfig::default()
        });
        heap.create_relation("nums", 4).unwrap();
        for v in values {
            heap.insert_tuple("nums", &v.to_ne_bytes()).unwrap();
        }
        heap
    }

    fn int_filter(value: &[u8], op: CompareOp) -> ScanFilter<'_> {
        ScanFilter {
            offset: 0,
            length: 4,
            data_type: DataType::Integer,
            value: Some(value),
            op,
        }
    }

    #[test]
    fn insert_assigns_paged_record_ids() {
        let heap = heap_with_ints(&[]);
        assert_eq!(heap.insert_tuple("nums", &[0; 4]).unwrap(), RecordId::new(0, 0));
        assert_eq!(heap.insert_tuple("nums", &[0; 4]).unwrap(), RecordId::new(0, 1));
        assert_eq!(heap.insert_tuple("nums", &[0; 4]).unwrap(), RecordId::new(1, 0));
        assert!(matches!(
            heap.insert_tuple("nums", &[0; 3]),
            Err(QuillQueryError::Storage(StorageError::RecordLength { .. }))
        ));
        assert!(matches!(
            heap.insert_tuple("other", &[0; 4]),
            Err(QuillQueryError::Storage(StorageError::UnknownRelation(_)))
        ));
    }

    #[test]
    fn unconditional_scan_visits_every_record() {
        let heap = heap_with_ints(&[1, 2, 3]);
        let scan = heap.open_scan("nums").unwrap();
        heap.start_filter(scan, &ScanFilter::unconditional()).unwrap();
        let mut seen = vec![];
        while let Some(rid) = heap.next(scan).unwrap() {
            let bytes = heap.fetch(scan, rid).unwrap();
            seen.push(i32::from_ne_bytes(bytes[..].try_into().unwrap()));
        }
        heap.close_scan(scan);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(heap.open_scan_count(), 0);
    }

    #[test]
    fn filtered_scan_and_delete() {
        let heap = heap_with_ints(&[5, 10, 15, 20]);
        let value = 10i32.to_ne_bytes();
        let scan = heap.open_scan("nums").unwrap();
        heap.start_filter(scan, &int_filter(&value, CompareOp::GtEq)).unwrap();
        while heap.next(scan).unwrap().is_some() {
            heap.delete_current(scan).unwrap();
        }
        heap.close_scan(scan);

        assert_eq!(heap.record_count("nums").unwrap(), 1);
        assert_eq!(heap.records("nums").unwrap()[0][..], 5i32.to_ne_bytes());
    }

    #[test]
    fn scan_protocol_errors() {
        let heap = heap_with_ints(&[1]);
        let scan = heap.open_scan("nums").unwrap();
        assert!(matches!(
            heap.next(scan),
            Err(QuillQueryError::Storage(StorageError::ScanNotStarted(_)))
        ));
        heap.start_filter(scan, &ScanFilter::unconditional()).unwrap();
        assert!(matches!(
            heap.delete_current(scan),
            Err(QuillQueryError::Storage(StorageError::NoCurrentRecord(_)))
        ));
        let rid = heap.next(scan).unwrap().unwrap();
        assert!(matches!(
            heap.fetch(scan, RecordId::new(9, 9)),
            Err(QuillQueryError::Storage(StorageError::StaleRecord(_)))
        ));
        heap.delete_current(scan).unwrap();
        assert!(heap.fetch(scan, rid).is_err());
        assert_eq!(heap.next(scan).unwrap(), None);
        heap.close_scan(scan);
        assert!(matches!(
            heap.next(scan),
            Err(QuillQueryError::Storage(StorageError::InvalidHandle(_)))
        ));
    }

    #[test]
    fn bad_filter_parameters() {
        let heap = heap_with_ints(&[1]);
        let scan = heap.open_scan("nums").unwrap();
        let value = 1i32.to_ne_bytes();
        let mut filter = int_filter(&value, CompareOp::Eq);
        filter.offset = 2;
        assert!(matches!(
            heap.start_filter(scan, &filter),
            Err(QuillQueryError::Storage(StorageError::BadScanParameter(_)))
        ));
        let short = [1u8, 0];
        assert!(heap
            .start_filter(scan, &int_filter(&short, CompareOp::Eq))
            .is_err());
        heap.close_scan(scan);
    }

    #[test]
    fn overflowing_filter_range_is_rejected() {
        let heap = heap_with_ints(&[1]);
        let scan = heap.open_scan("nums").unwrap();
        let value = 1i32.to_ne_bytes();
        let mut filter = int_filter(&value, CompareOp::Eq);
        filter.offset = usize::MAX;
        assert!(matches!(
            heap.start_filter(scan, &filter),
            Err(QuillQueryError::Storage(StorageError::BadScanParameter(_)))
        ));
        heap.close_scan(scan);
    }

    #[test]
    fn wrapped_handle_ids_skip_open_scans() {
        let heap = heap_with_ints(&[1]);
        heap.state.lock().next_handle = u32::MAX;
        let last = heap.open_scan("nums").unwrap();
        let first = heap.open_scan("nums").unwrap();
        assert_eq!((last.id(), first.id()), (u32::MAX, 0));

        heap.state.lock().next_handle = u32::MAX;
        let third = heap.open_scan("nums").unwrap();
        assert_eq!(third.id(), 1);
        assert_eq!(heap.open_scan_count(), 3);

        heap.start_filter(last, &ScanFilter::unconditional()).unwrap();
        assert!(heap.next(last).unwrap().is_some());
        for scan in [last, first, third] {
            heap.close_scan(scan);
        }
        assert_eq!(heap.open_scan_count(), 0);
    }

    #[test]
    fn scan_pool_is_bounded() {
        let heap = MemoryHeap::new(HeapConfig {
            max_open_scans: 2,
            ..HeapConfig::default()
        });
        heap.create_relation("r", 4).unwrap();
        let a = heap.open_scan("r").unwrap();
        let _b = heap.open_scan("r").unwrap();
        assert!(matches!(
            heap.open_scan("r"),
            Err(QuillQueryError::Storage(StorageError::ScanPoolExhausted(2)))
        ));
        heap.close_scan(a);
        assert!(heap.open_scan("r").is_ok());
    }

    #[test]
    fn inserts_during_scan_are_not_visited() {
        let heap = heap_with_ints(&[1, 2]);
        let scan = heap.open_scan("nums").unwrap();
        heap.start_filter(scan, &ScanFilter::unconditional()).unwrap();
        let mut visited = 0;
        while heap.next(scan).unwrap().is_some() {
            heap.insert_tuple("nums", &0i32.to_ne_bytes()).unwrap();
            visited += 1;
        }
        heap.close_scan(scan);
        assert_eq!(visited, 2);
        assert_eq!(heap.record_count("nums").unwrap(), 4);
    }

    #[test]
    fn relation_capacity() {
        let heap = MemoryHeap::new(HeapConfig {
            max_records_per_relation: Some(1),
            ..HeapConfig::default()
        });
        heap.create_relation("r", 4).unwrap();
        heap.insert_tuple("r", &[0; 4]).unwrap();
        assert!(matches!(
            heap.insert_tuple("r", &[0; 4]),
            Err(QuillQueryError::Storage(StorageError::RelationFull { capacity: 1, .. }))
        ));
    }
}
