use crate::error::QuillQueryError;
use strum::{Display, EnumString};

/// Width in bytes of every numeric attribute.
pub const NUMERIC_WIDTH: usize = 4;

/// Stored attribute types. The discriminants are the codes a catalog records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DataType {
    String = 0,
    Integer = 1,
    Float = 2,
}

impl DataType {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Fixed width for numeric types; strings take their declared length.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            DataType::Integer | DataType::Float => Some(NUMERIC_WIDTH),
            DataType::String => None,
        }
    }
}

impl TryFrom<i32> for DataType {
    type Error = QuillQueryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DataType::String),
            1 => Ok(DataType::Integer),
            2 => Ok(DataType::Float),
            _ => Err(QuillQueryError::UnsupportedType(format!(
                "type code {value} is not one of INTEGER, FLOAT, STRING"
            ))),
        }
    }
}
