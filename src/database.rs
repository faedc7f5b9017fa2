use log::{debug, info};
use std::sync::Arc;

use crate::catalog::{
    Catalog, ColumnDef, DataType, MemoryCatalog, RelationLayout, SchemaResolver,
};
use crate::config::{DatabaseOptions, ExecutionConfig};
use crate::error::QuillQueryResult;
use crate::execution::marshal::AttributeValue;
use crate::execution::physical_plan::{
    AttributeName, PhysicalDelete, PhysicalInsert, PhysicalPlan, PhysicalSelect,
};
use crate::execution::{ExecutionContext, QueryExecutor};
use crate::expression::CompareOp;
use crate::storage::tuple::Tuple;
use crate::storage::{MemoryHeap, StorageEngine};

/// In-memory catalog and heap wired to the query operators.
pub struct Database {
    pub(crate) catalog: Arc<MemoryCatalog>,
    pub(crate) heap: Arc<MemoryHeap>,
    options: DatabaseOptions,
}

impl Database {
    pub fn new(options: DatabaseOptions) -> Self {
        info!(
            "database started: {:?} parsing, {} scan handles",
            options.execution.parse_mode, options.heap.max_open_scans
        );
        Self {
            catalog: Arc::new(MemoryCatalog::new()),
            heap: Arc::new(MemoryHeap::new(options.heap)),
            options,
        }
    }

    /// Registers the relation in the catalog and allocates its heap file.
    pub fn create_relation(&self, relation: &str, columns: &[ColumnDef]) -> QuillQueryResult<usize> {
        let tuple_len = self.catalog.create_relation(relation, columns)?;
        if let Err(e) = self.heap.create_relation(relation, tuple_len) {
            self.catalog.drop_relation(relation)?;
            return Err(e);
        }
        debug!("created relation {} ({} bytes)", relation, tuple_len);
        Ok(tuple_len)
    }

    pub fn drop_relation(&self, relation: &str) -> QuillQueryResult<()> {
        self.heap.drop_relation(relation)?;
        self.catalog.drop_relation(relation)
    }

    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }

    pub fn context(&self) -> ExecutionContext {
        self.context_with(self.options.execution)
    }

    pub fn context_with(&self, config: ExecutionConfig) -> ExecutionContext {
        let catalog: Arc<dyn Catalog> = self.catalog.clone();
        let storage: Arc<dyn StorageEngine> = self.heap.clone();
        ExecutionContext::new(SchemaResolver::new(catalog), storage, config)
    }

    pub fn execute(&self, plan: &PhysicalPlan) -> QuillQueryResult<usize> {
        debug!("execute {}", plan);
        plan.execute(&self.context())
    }

    pub fn insert(&self, relation: &str, values: Vec<AttributeValue>) -> QuillQueryResult<usize> {
        self.execute(&PhysicalInsert::new(relation.to_string(), values).into())
    }

    /// Deletes records of `relation` where `attribute op value` holds. An empty
    /// attribute name deletes everything.
    pub fn delete(
        &self,
        relation: &str,
        attribute: &str,
        op: CompareOp,
        data_type: DataType,
        value: &[u8],
    ) -> QuillQueryResult<usize> {
        self.execute(&PhysicalDelete::new(relation, attribute, op, data_type, value).into())
    }

    pub fn select(
        &self,
        result: &str,
        projections: Vec<AttributeName>,
        filter: Option<AttributeValue>,
        op: CompareOp,
    ) -> QuillQueryResult<usize> {
        self.execute(&PhysicalSelect::new(result.to_string(), projections, filter, op).into())
    }

    pub fn layout(&self, relation: &str) -> QuillQueryResult<RelationLayout> {
        self.context().resolver.resolve_all_attributes(relation)
    }

    /// Live records of `relation` in storage order.
    pub fn scan_tuples(&self, relation: &str) -> QuillQueryResult<Vec<Tuple>> {
        Ok(self
            .heap
            .records(relation)?
            .into_iter()
            .map(|bytes| Tuple::from_bytes(bytes.to_vec()))
            .collect())
    }

    pub fn open_scan_count(&self) -> usize {
        self.heap.open_scan_count()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(DatabaseOptions::default())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("relations", &self.catalog.relation_names())
            .field("options", &self.options)
            .finish()
    }
}
