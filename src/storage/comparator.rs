//! Ordering of a stored attribute against a filter constant of the same encoding.

use std::cmp::Ordering;

use crate::catalog::DataType;
use crate::error::QuillQueryResult;
use crate::storage::codec::{c_str, ValueCodec};

/// `None` when the values are unordered, which only happens for NaN floats.
pub fn compare_attribute(
    data_type: DataType,
    stored: &[u8],
    constant: &[u8],
) -> QuillQueryResult<Option<Ordering>> {
    match data_type {
        DataType::Integer => {
            let left = ValueCodec::decode_integer(stored)?;
            let right = ValueCodec::decode_integer(constant)?;
            Ok(Some(left.cmp(&right)))
        }
        DataType::Float => {
            let left = ValueCodec::decode_float(stored)?;
            let right = ValueCodec::decode_float(constant)?;
            Ok(left.partial_cmp(&right))
        }
        DataType::String => Ok(Some(string_comparator(stored, constant))),
    }
}

/// `strncmp(stored, constant, stored.len())`.
pub fn string_comparator(stored: &[u8], constant: &[u8]) -> Ordering {
    let limit = stored.len().min(constant.len());
    c_str(stored).cmp(c_str(&constant[..limit]))
}
