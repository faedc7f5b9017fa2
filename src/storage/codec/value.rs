use crate::catalog::{DataType, NUMERIC_WIDTH};
use crate::config::ParseMode;
use crate::error::{QuillQueryError, QuillQueryResult};
use crate::storage::codec::text::{parse_float, parse_integer};

/// Fixed-width attribute encoding. Numbers use native byte order, strings are
/// NUL terminated inside their declared length.
pub struct ValueCodec;

impl ValueCodec {
    /// Encodes `raw` into a fresh zeroed buffer of `length` bytes.
    pub fn encode(
        raw: &[u8],
        data_type: DataType,
        length: usize,
        mode: ParseMode,
    ) -> QuillQueryResult<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(length)?;
        buf.resize(length, 0);
        Self::encode_into(raw, data_type, &mut buf, mode)?;
        Ok(buf)
    }

    /// Writes the encoding of `raw` over `dest`, whose length is the attribute length.
    /// String bytes past the copied text are left as they were.
    pub fn encode_into(
        raw: &[u8],
        data_type: DataType,
        dest: &mut [u8],
        mode: ParseMode,
    ) -> QuillQueryResult<()> {
        match data_type {
            DataType::Integer => {
                check_numeric_width(data_type, dest.len())?;
                dest.copy_from_slice(&Self::encode_integer(parse_integer(raw, mode)?));
            }
            DataType::Float => {
                check_numeric_width(data_type, dest.len())?;
                dest.copy_from_slice(&Self::encode_float(parse_float(raw, mode)?));
            }
            DataType::String => Self::encode_string_into(raw, dest),
        }
        Ok(())
    }

    /// `strncpy` followed by a terminator in the last byte.
    pub fn encode_string_into(raw: &[u8], dest: &mut [u8]) {
        let Some(last) = dest.len().checked_sub(1) else {
            return;
        };
        let text_len = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        let copied = text_len.min(dest.len());
        dest[..copied].copy_from_slice(&raw[..copied]);
        dest[last] = 0;
    }

    pub fn encode_integer(value: i32) -> [u8; NUMERIC_WIDTH] {
        value.to_ne_bytes()
    }

    pub fn encode_float(value: f32) -> [u8; NUMERIC_WIDTH] {
        value.to_ne_bytes()
    }

    pub fn decode_integer(bytes: &[u8]) -> QuillQueryResult<i32> {
        Ok(i32::from_ne_bytes(numeric_array(bytes, DataType::Integer)?))
    }

    pub fn decode_float(bytes: &[u8]) -> QuillQueryResult<f32> {
        Ok(f32::from_ne_bytes(numeric_array(bytes, DataType::Float)?))
    }

    /// Text up to the first NUL, or the whole slice when none is present.
    pub fn decode_string(bytes: &[u8]) -> String {
        String::from_utf8_lossy(c_str(bytes)).into_owned()
    }

    /// Human readable form of one attribute value.
    pub fn display(bytes: &[u8], data_type: DataType) -> QuillQueryResult<String> {
        match data_type {
            DataType::Integer => Self::decode_integer(bytes).map(|v| v.to_string()),
            DataType::Float => Self::decode_float(bytes).map(|v| v.to_string()),
            DataType::String => Ok(Self::decode_string(bytes)),
        }
    }
}

pub(crate) fn c_str(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

fn check_numeric_width(data_type: DataType, len: usize) -> QuillQueryResult<()> {
    if len != NUMERIC_WIDTH {
        return Err(QuillQueryError::Internal(format!(
            "{data_type} value needs {NUMERIC_WIDTH} bytes, attribute has {len}"
        )));
    }
    Ok(())
}

fn numeric_array(bytes: &[u8], data_type: DataType) -> QuillQueryResult<[u8; NUMERIC_WIDTH]> {
    bytes.try_into().map_err(|_| {
        QuillQueryError::Internal(format!(
            "{data_type} value needs {NUMERIC_WIDTH} bytes, got {}",
            bytes.len()
        ))
    })
}
