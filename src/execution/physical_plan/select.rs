use log::{debug, trace, warn};

use crate::catalog::AttributeRef;
use crate::error::{QuillQueryError, QuillQueryResult};
use crate::execution::marshal::{project_tuple, AttributeValue};
use crate::execution::scan::{PredicateScan, ScanPredicate};
use crate::execution::{ExecutionContext, QueryExecutor};
use crate::expression::CompareOp;
use crate::storage::codec::ValueCodec;

/// `relation.attribute` reference in a projection list.
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct AttributeName {
    pub relation: String,
    pub attribute: String,
}

impl AttributeName {
    pub fn of(relation: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(relation.into(), attribute.into())
    }
}

/// Scans one relation, keeps records matching an optional comparison, and appends
/// the projected attributes of each to `result`.
#[derive(derive_new::new, Debug)]
pub struct PhysicalSelect {
    pub result: String,
    pub projections: Vec<AttributeName>,
    pub filter: Option<AttributeValue>,
    pub op: CompareOp,
}

impl PhysicalSelect {
    fn resolve_projection(
        &self,
        context: &ExecutionContext,
    ) -> QuillQueryResult<(String, Vec<AttributeRef>)> {
        let Some(first) = self.projections.first() else {
            return Err(QuillQueryError::NotSupport(
                "select needs at least one projected attribute".to_string(),
            ));
        };
        let source = first.relation.clone();
        let mut attrs = Vec::with_capacity(self.projections.len());
        for name in self.projections.iter() {
            if name.relation != source {
                return Err(QuillQueryError::NotSupport(format!(
                    "projection mixes relations {} and {}",
                    source, name.relation
                )));
            }
            attrs.push(
                context
                    .resolver
                    .resolve_attribute(&name.relation, &name.attribute)?,
            );
        }
        Ok((source, attrs))
    }

    fn resolve_filter(
        &self,
        context: &ExecutionContext,
        source: &str,
    ) -> QuillQueryResult<Option<ScanPredicate>> {
        let Some(filter) = &self.filter else {
            return Ok(None);
        };
        if filter.relation != source {
            return Err(QuillQueryError::NotSupport(format!(
                "filter on {} while scanning {}",
                filter.relation, source
            )));
        }
        let attr = context
            .resolver
            .resolve_attribute(&filter.relation, &filter.attribute)?;
        if attr.data_type != filter.data_type {
            warn!(
                "select filter on {}.{}: declared {} but stored as {}",
                filter.relation, filter.attribute, filter.data_type, attr.data_type
            );
        }
        ScanPredicate::for_attribute(&attr, self.op, &filter.value, context.config.parse_mode)
            .map(Some)
    }
}

impl QueryExecutor for PhysicalSelect {
    fn execute(&self, context: &ExecutionContext) -> QuillQueryResult<usize> {
        let (source, projection) = self.resolve_projection(context)?;
        let width: usize = projection.iter().map(|attr| attr.length).sum();

        let result_layout = context.resolver.resolve_all_attributes(&self.result)?;
        if result_layout.tuple_len != width {
            return Err(QuillQueryError::Internal(format!(
                "projection is {} bytes but {} records are {} bytes",
                width, self.result, result_layout.tuple_len
            )));
        }

        let predicate = self.resolve_filter(context, &source)?;
        debug!(
            "select from {} into {}, {} attributes, {} bytes, filtered: {}",
            source,
            self.result,
            projection.len(),
            width,
            predicate.is_some()
        );

        let mut scan = PredicateScan::open(context.storage.as_ref(), &source, predicate.as_ref())?;
        let mut selected = 0;
        while let Some(rid) = scan.next_rid()? {
            let tuple = scan.current()?;
            let output = project_tuple(&tuple, &projection)?;
            let out_rid = context.storage.insert_tuple(&self.result, output.as_bytes())?;
            trace!("{} {} -> {} {}", source, rid, self.result, out_rid);
            selected += 1;
        }
        scan.close();
        debug!("selected {} records into {}", selected, self.result);
        Ok(selected)
    }
}

impl std::fmt::Display for PhysicalSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns = self
            .projections
            .iter()
            .map(|p| format!("{}.{}", p.relation, p.attribute))
            .collect::<Vec<_>>()
            .join(", ");
        match &self.filter {
            Some(filter) => write!(
                f,
                "Select: [{}] into {} where {}.{} {} {}",
                columns,
                self.result,
                filter.relation,
                filter.attribute,
                self.op,
                ValueCodec::decode_string(&filter.value)
            ),
            None => write!(f, "Select: [{}] into {}", columns, self.result),
        }
    }
}
