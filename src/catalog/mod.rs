mod attribute;
mod catalog;
mod data_type;
mod resolver;

pub use attribute::{AttributeDescriptor, AttributeRecord, AttributeRef, ColumnDef, RelationLayout};
pub use catalog::{Catalog, MemoryCatalog};
pub use data_type::{DataType, NUMERIC_WIDTH};
pub use resolver::SchemaResolver;
