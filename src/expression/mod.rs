mod compare;

pub use compare::CompareOp;
