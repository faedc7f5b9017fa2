pub mod codec;
pub mod comparator;
pub mod engine;
pub mod heap;
pub mod tuple;

pub use engine::{RecordId, ScanFilter, ScanHandle, StorageEngine};
pub use heap::MemoryHeap;
