use std::sync::Arc;

use crate::catalog::{AttributeDescriptor, AttributeRecord, AttributeRef, Catalog, DataType, RelationLayout};
use crate::error::{QuillQueryError, QuillQueryResult};

/// Turns catalog rows into typed descriptors. Holds no cache; every call goes to
/// the catalog.
#[derive(Clone)]
pub struct SchemaResolver {
    catalog: Arc<dyn Catalog>,
}

impl SchemaResolver {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    pub fn resolve_attribute(&self, relation: &str, name: &str) -> QuillQueryResult<AttributeRef> {
        let record = self.catalog.attribute(relation, name)?;
        Ok(Arc::new(describe(record)?))
    }

    pub fn resolve_all_attributes(&self, relation: &str) -> QuillQueryResult<RelationLayout> {
        let records = self.catalog.relation_attributes(relation)?;
        if records.is_empty() {
            return Err(QuillQueryError::NotFound(format!(
                "relation {relation} has no attributes"
            )));
        }
        let attributes = records
            .into_iter()
            .map(|record| describe(record).map(Arc::new))
            .collect::<QuillQueryResult<Vec<AttributeRef>>>()?;
        Ok(RelationLayout::new(relation, attributes))
    }
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver").finish_non_exhaustive()
    }
}

fn describe(record: AttributeRecord) -> QuillQueryResult<AttributeDescriptor> {
    let data_type = DataType::try_from(record.type_code).map_err(|_| {
        QuillQueryError::UnsupportedType(format!(
            "attribute {}.{} has type code {}",
            record.relation, record.name, record.type_code
        ))
    })?;
    Ok(AttributeDescriptor::new(
        record.relation,
        record.name,
        record.offset,
        record.length,
        data_type,
    ))
}
