use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use std::collections::HashSet;

use crate::catalog::{AttributeRecord, ColumnDef};
use crate::error::{QuillQueryError, QuillQueryResult};

/// Schema metadata source consumed by the operators.
pub trait Catalog: Send + Sync {
    fn attribute(&self, relation: &str, name: &str) -> QuillQueryResult<AttributeRecord>;

    /// All attributes of `relation` ordered by offset.
    fn relation_attributes(&self, relation: &str) -> QuillQueryResult<Vec<AttributeRecord>>;
}

/// Catalog kept entirely in memory, keyed by relation name.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    relations: DashMap<String, Vec<AttributeRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            relations: DashMap::new(),
        }
    }

    /// Lays the columns out back to back in declaration order and returns the
    /// resulting tuple length.
    pub fn create_relation(&self, relation: &str, columns: &[ColumnDef]) -> QuillQueryResult<usize> {
        if columns.is_empty() {
            return Err(QuillQueryError::InvalidValue(format!(
                "relation {relation} needs at least one attribute"
            )));
        }
        let mut seen = HashSet::new();
        let mut offset = 0;
        let mut records = Vec::with_capacity(columns.len());
        for col in columns {
            if !seen.insert(col.name.as_str()) {
                return Err(QuillQueryError::InvalidValue(format!(
                    "duplicate attribute {} in relation {relation}",
                    col.name
                )));
            }
            match col.data_type.fixed_width() {
                Some(width) if width != col.length => {
                    return Err(QuillQueryError::InvalidValue(format!(
                        "{} attribute {} must be {width} bytes, got {}",
                        col.data_type, col.name, col.length
                    )));
                }
                None if col.length == 0 => {
                    return Err(QuillQueryError::InvalidValue(format!(
                        "string attribute {} must be at least one byte",
                        col.name
                    )));
                }
                _ => {}
            }
            records.push(AttributeRecord::new(
                relation.to_string(),
                col.name.clone(),
                offset,
                col.length,
                col.data_type.code(),
            ));
            offset += col.length;
        }
        self.insert_relation(relation, records)?;
        Ok(offset)
    }

    /// Registers attribute rows produced elsewhere. Type codes are stored as given;
    /// the rows must still tile the tuple.
    pub fn register_raw(
        &self,
        relation: &str,
        mut records: Vec<AttributeRecord>,
    ) -> QuillQueryResult<usize> {
        records.sort_by_key(|r| r.offset);
        let mut expected = 0;
        for record in &records {
            if record.relation != relation {
                return Err(QuillQueryError::InvalidValue(format!(
                    "attribute {} belongs to {}, not {relation}",
                    record.name, record.relation
                )));
            }
            if record.offset != expected || record.length == 0 {
                return Err(QuillQueryError::InvalidValue(format!(
                    "attribute {} at offset {} does not tile relation {relation}",
                    record.name, record.offset
                )));
            }
            expected += record.length;
        }
        self.insert_relation(relation, records)?;
        Ok(expected)
    }

    pub fn drop_relation(&self, relation: &str) -> QuillQueryResult<()> {
        self.relations
            .remove(relation)
            .map(|_| ())
            .ok_or_else(|| QuillQueryError::NotFound(format!("relation {relation}")))
    }

    pub fn relation_names(&self) -> Vec<String> {
        let mut names = self
            .relations
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    fn insert_relation(&self, relation: &str, records: Vec<AttributeRecord>) -> QuillQueryResult<()> {
        match self.relations.entry(relation.to_string()) {
            Entry::Occupied(_) => Err(QuillQueryError::InvalidValue(format!(
                "relation {relation} already exists"
            ))),
            Entry::Vacant(slot) => {
                debug!("catalog: register {} with {} attributes", relation, records.len());
                slot.insert(records);
                Ok(())
            }
        }
    }
}

impl Catalog for MemoryCatalog {
    fn attribute(&self, relation: &str, name: &str) -> QuillQueryResult<AttributeRecord> {
        let Some(records) = self.relations.get(relation) else {
            return Err(QuillQueryError::NotFound(format!("relation {relation}")));
        };
        records
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| QuillQueryError::NotFound(format!("attribute {relation}.{name}")))
    }

    fn relation_attributes(&self, relation: &str) -> QuillQueryResult<Vec<AttributeRecord>> {
        self.relations
            .get(relation)
            .map(|records| records.clone())
            .ok_or_else(|| QuillQueryError::NotFound(format!("relation {relation}")))
    }
}
