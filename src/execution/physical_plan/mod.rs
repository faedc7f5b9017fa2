mod delete;
mod insert;
mod select;

pub use delete::{DeletePredicate, PhysicalDelete};
pub use insert::PhysicalInsert;
pub use select::{AttributeName, PhysicalSelect};

use crate::error::QuillQueryResult;
use crate::execution::{ExecutionContext, QueryExecutor};

#[derive(Debug)]
pub enum PhysicalPlan {
    Insert(PhysicalInsert),
    Delete(PhysicalDelete),
    Select(PhysicalSelect),
}

impl QueryExecutor for PhysicalPlan {
    fn execute(&self, context: &ExecutionContext) -> QuillQueryResult<usize> {
        match self {
            PhysicalPlan::Insert(op) => op.execute(context),
            PhysicalPlan::Delete(op) => op.execute(context),
            PhysicalPlan::Select(op) => op.execute(context),
        }
    }
}

impl std::fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert(op) => write!(f, "{op}"),
            Self::Delete(op) => write!(f, "{op}"),
            Self::Select(op) => write!(f, "{op}"),
        }
    }
}

impl From<PhysicalInsert> for PhysicalPlan {
    fn from(value: PhysicalInsert) -> Self {
        PhysicalPlan::Insert(value)
    }
}

impl From<PhysicalDelete> for PhysicalPlan {
    fn from(value: PhysicalDelete) -> Self {
        PhysicalPlan::Delete(value)
    }
}

impl From<PhysicalSelect> for PhysicalPlan {
    fn from(value: PhysicalSelect) -> Self {
        PhysicalPlan::Select(value)
    }
}
