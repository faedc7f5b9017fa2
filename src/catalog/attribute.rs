use std::sync::Arc;

use crate::catalog::{DataType, NUMERIC_WIDTH};

/// An attribute row as the catalog stores it. The type is kept as a raw code so a
/// catalog written by another tool can carry a kind this layer does not understand.
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub relation: String,
    pub name: String,
    pub offset: usize,
    pub length: usize,
    pub type_code: i32,
}

/// A resolved attribute: where it lives in a tuple and how its bytes are read.
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub relation: String,
    pub name: String,
    pub offset: usize,
    pub length: usize,
    pub data_type: DataType,
}

pub type AttributeRef = Arc<AttributeDescriptor>;

impl AttributeDescriptor {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Column declaration used when creating a relation.
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub length: usize,
}

impl ColumnDef {
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name.into(), DataType::Integer, NUMERIC_WIDTH)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name.into(), DataType::Float, NUMERIC_WIDTH)
    }

    pub fn string(name: impl Into<String>, length: usize) -> Self {
        Self::new(name.into(), DataType::String, length)
    }
}

/// Every attribute of one relation in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLayout {
    pub relation: String,
    pub attributes: Vec<AttributeRef>,
    pub tuple_len: usize,
}

impl RelationLayout {
    pub fn new(relation: impl Into<String>, attributes: Vec<AttributeRef>) -> Self {
        let tuple_len = attributes.iter().map(|attr| attr.length).sum();
        Self {
            relation: relation.into(),
            attributes,
            tuple_len,
        }
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeRef> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// True when the attribute ranges cover `0..tuple_len` exactly once.
    pub fn is_tiled(&self) -> bool {
        let mut ranges = self
            .attributes
            .iter()
            .map(|attr| attr.range())
            .collect::<Vec<_>>();
        ranges.sort_by_key(|r| r.start);
        let mut expected = 0;
        for range in ranges {
            if range.start != expected {
                return false;
            }
            expected = range.end;
        }
        expected == self.tuple_len
    }
}
