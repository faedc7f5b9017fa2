use std::fmt::{Display, Formatter};

use crate::catalog::AttributeDescriptor;
use crate::error::{QuillQueryError, QuillQueryResult};
use crate::storage::codec::ValueCodec;

/// One fixed-length record. The bytes are positional; attribute descriptors give
/// them meaning.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Tuple {
    data: Vec<u8>,
}

impl Tuple {
    /// Allocates `len` zero bytes, reporting allocation failure instead of aborting.
    pub fn zeroed(len: usize) -> QuillQueryResult<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self { data })
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn attribute(&self, attr: &AttributeDescriptor) -> QuillQueryResult<&[u8]> {
        let len = self.data.len();
        self.data
            .get(attr.range())
            .ok_or_else(|| out_of_range(attr, len))
    }

    pub fn attribute_mut(&mut self, attr: &AttributeDescriptor) -> QuillQueryResult<&mut [u8]> {
        let len = self.data.len();
        self.data
            .get_mut(attr.range())
            .ok_or_else(|| out_of_range(attr, len))
    }

    /// Decodes every listed attribute for display.
    pub fn render<'a>(
        &self,
        attrs: impl IntoIterator<Item = &'a AttributeDescriptor>,
    ) -> QuillQueryResult<Vec<String>> {
        attrs
            .into_iter()
            .map(|attr| ValueCodec::display(self.attribute(attr)?, attr.data_type))
            .collect()
    }
}

fn out_of_range(attr: &AttributeDescriptor, len: usize) -> QuillQueryError {
    QuillQueryError::Internal(format!(
        "attribute {}.{} at {}..{} is outside a {len} byte tuple",
        attr.relation,
        attr.name,
        attr.offset,
        attr.offset + attr.length
    ))
}

impl Display for Tuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hex = self
            .data
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "[{}]", hex)
    }
}
