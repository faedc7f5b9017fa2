use log::{debug, warn};

use crate::catalog::DataType;
use crate::error::QuillQueryResult;
use crate::execution::scan::{PredicateScan, ScanPredicate};
use crate::execution::{ExecutionContext, QueryExecutor};
use crate::expression::CompareOp;
use crate::storage::codec::ValueCodec;

#[derive(Debug, Clone)]
pub struct DeletePredicate {
    pub attribute: String,
    pub op: CompareOp,
    pub data_type: DataType,
    pub value: Vec<u8>,
}

/// Removes every record of a relation matching an optional single-attribute
/// comparison.
#[derive(Debug)]
pub struct PhysicalDelete {
    pub relation: String,
    pub predicate: Option<DeletePredicate>,
}

impl PhysicalDelete {
    /// An empty `attribute` deletes every record; `op`, `data_type` and `value` are
    /// ignored then.
    pub fn new(
        relation: impl Into<String>,
        attribute: &str,
        op: CompareOp,
        data_type: DataType,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        let predicate = (!attribute.is_empty()).then(|| DeletePredicate {
            attribute: attribute.to_string(),
            op,
            data_type,
            value: value.into(),
        });
        Self {
            relation: relation.into(),
            predicate,
        }
    }

    pub fn all(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            predicate: None,
        }
    }
}

impl QueryExecutor for PhysicalDelete {
    fn execute(&self, context: &ExecutionContext) -> QuillQueryResult<usize> {
        let predicate = match &self.predicate {
            None => {
                context.resolver.resolve_all_attributes(&self.relation)?;
                None
            }
            Some(p) => {
                let attr = context
                    .resolver
                    .resolve_attribute(&self.relation, &p.attribute)?;
                if attr.data_type != p.data_type {
                    warn!(
                        "delete on {}.{}: declared {} but stored as {}",
                        self.relation, p.attribute, p.data_type, attr.data_type
                    );
                }
                Some(ScanPredicate::for_attribute(
                    &attr,
                    p.op,
                    &p.value,
                    context.config.parse_mode,
                )?)
            }
        };

        let mut scan = PredicateScan::open(
            context.storage.as_ref(),
            &self.relation,
            predicate.as_ref(),
        )?;
        let mut deleted = 0;
        while scan.next_rid()?.is_some() {
            scan.delete_current()?;
            deleted += 1;
        }
        scan.close();
        debug!("deleted {} records from {}", deleted, self.relation);
        Ok(deleted)
    }
}

impl std::fmt::Display for PhysicalDelete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.predicate {
            Some(p) => write!(
                f,
                "Delete: {} where {} {} {}",
                self.relation,
                p.attribute,
                p.op,
                ValueCodec::decode_string(&p.value)
            ),
            None => write!(f, "Delete: {}", self.relation),
        }
    }
}
