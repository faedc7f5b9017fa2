use log::debug;

use crate::error::QuillQueryResult;
use crate::execution::marshal::{build_tuple, AttributeValue};
use crate::execution::{ExecutionContext, QueryExecutor};

/// Adds one record, assembled from named values, to a relation.
#[derive(derive_new::new, Debug)]
pub struct PhysicalInsert {
    pub relation: String,
    pub values: Vec<AttributeValue>,
}

impl QueryExecutor for PhysicalInsert {
    fn execute(&self, context: &ExecutionContext) -> QuillQueryResult<usize> {
        debug!(
            "insert into {} with {} values",
            self.relation,
            self.values.len()
        );
        let layout = context.resolver.resolve_all_attributes(&self.relation)?;
        let tuple = build_tuple(&layout, &self.values, context.config.parse_mode)?;
        let rid = context
            .storage
            .insert_tuple(&self.relation, tuple.as_bytes())?;
        debug!("inserted {} into {}", rid, self.relation);
        Ok(1)
    }
}

impl std::fmt::Display for PhysicalInsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Insert: {}", self.relation)
    }
}
