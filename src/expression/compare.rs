use std::cmp::Ordering;
use strum::{Display, EnumString};

/// Comparison applied between a stored attribute (left) and a filter constant (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum CompareOp {
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    LtEq,
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = ">=")]
    GtEq,
    #[strum(serialize = ">")]
    Gt,
    #[strum(to_string = "<>", serialize = "!=")]
    NotEq,
}

impl CompareOp {
    fn accepted(&self) -> &'static [Ordering] {
        match self {
            CompareOp::Lt => &[Ordering::Less],
            CompareOp::LtEq => &[Ordering::Less, Ordering::Equal],
            CompareOp::Eq => &[Ordering::Equal],
            CompareOp::GtEq => &[Ordering::Greater, Ordering::Equal],
            CompareOp::Gt => &[Ordering::Greater],
            CompareOp::NotEq => &[Ordering::Greater, Ordering::Less],
        }
    }

    /// `None` means the operands are unordered (a NaN float); only `<>` holds then.
    pub fn evaluate(&self, ordering: Option<Ordering>) -> bool {
        match ordering {
            Some(order) => self.accepted().contains(&order),
            None => matches!(self, CompareOp::NotEq),
        }
    }
}
