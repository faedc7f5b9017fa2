pub mod marshal;
pub mod physical_plan;
pub mod scan;

use std::sync::Arc;

use crate::catalog::SchemaResolver;
use crate::config::ExecutionConfig;
use crate::error::QuillQueryResult;
use crate::storage::StorageEngine;

/// A relational operator run to completion against the context's storage.
/// Returns how many records it inserted, deleted or selected.
pub trait QueryExecutor {
    fn execute(&self, context: &ExecutionContext) -> QuillQueryResult<usize>;
}

/// Everything an operator needs: catalog lookups, the heap, and execution knobs.
#[derive(Clone)]
pub struct ExecutionContext {
    pub resolver: SchemaResolver,
    pub storage: Arc<dyn StorageEngine>,
    pub config: ExecutionConfig,
}

impl ExecutionContext {
    pub fn new(
        resolver: SchemaResolver,
        storage: Arc<dyn StorageEngine>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            resolver,
            storage,
            config,
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
