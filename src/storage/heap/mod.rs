mod memory_heap;

pub use memory_heap::MemoryHeap;
