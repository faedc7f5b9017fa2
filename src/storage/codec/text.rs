use crate::config::ParseMode;
use crate::error::{QuillQueryError, QuillQueryResult};

pub fn parse_integer(text: &[u8], mode: ParseMode) -> QuillQueryResult<i32> {
    match mode {
        ParseMode::Lenient => Ok(lenient_integer(text)),
        ParseMode::Strict => {
            let trimmed = strict_text(text)?;
            trimmed.parse::<i32>().map_err(|e| {
                QuillQueryError::InvalidValue(format!("{trimmed:?} is not an INTEGER: {e}"))
            })
        }
    }
}

pub fn parse_float(text: &[u8], mode: ParseMode) -> QuillQueryResult<f32> {
    match mode {
        ParseMode::Lenient => Ok(lenient_float(text)),
        ParseMode::Strict => {
            let trimmed = strict_text(text)?;
            trimmed.parse::<f32>().map_err(|e| {
                QuillQueryError::InvalidValue(format!("{trimmed:?} is not a FLOAT: {e}"))
            })
        }
    }
}

/// `atoi`: skip leading whitespace, take an optional sign and the longest run of
/// digits. No digits gives 0; out of range saturates.
fn lenient_integer(text: &[u8]) -> i32 {
    let mut pos = skip_whitespace(text);
    let negative = match text.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };
    let limit = i32::MAX as i64 + 1;
    let mut value: i64 = 0;
    while let Some(digit) = text.get(pos).filter(|b| b.is_ascii_digit()) {
        value = (value * 10 + (digit - b'0') as i64).min(limit);
        pos += 1;
    }
    let value = if negative { -value } else { value };
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// `atof`: the longest prefix that reads as a decimal float, `inf`/`infinity` or
/// `nan`. Nothing readable gives 0.0.
fn lenient_float(text: &[u8]) -> f32 {
    let start = skip_whitespace(text);
    let end = float_prefix_end(text, start);
    std::str::from_utf8(&text[start..end])
        .ok()
        .and_then(|prefix| prefix.parse::<f32>().ok())
        .unwrap_or(0.0)
}

fn float_prefix_end(text: &[u8], start: usize) -> usize {
    let mut pos = start;
    if matches!(text.get(pos), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    for word in ["infinity", "inf", "nan"] {
        let candidate = text.get(pos..pos + word.len());
        if candidate.is_some_and(|c| c.eq_ignore_ascii_case(word.as_bytes())) {
            return pos + word.len();
        }
    }

    let digits_from = |mut at: usize| {
        while text.get(at).is_some_and(|b| b.is_ascii_digit()) {
            at += 1;
        }
        at
    };

    let int_end = digits_from(pos);
    let mut mantissa_digits = int_end - pos;
    pos = int_end;
    if text.get(pos) == Some(&b'.') {
        let frac_end = digits_from(pos + 1);
        mantissa_digits += frac_end - (pos + 1);
        pos = frac_end;
    }
    if mantissa_digits == 0 {
        return start;
    }

    if matches!(text.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp = pos + 1;
        if matches!(text.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            pos = exp_end;
        }
    }
    pos
}

fn skip_whitespace(text: &[u8]) -> usize {
    text.iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(text.len())
}

/// Text with surrounding whitespace and trailing terminators removed.
fn strict_text(text: &[u8]) -> QuillQueryResult<&str> {
    let text = std::str::from_utf8(text)
        .map_err(|e| QuillQueryError::InvalidValue(format!("numeric text is not utf-8: {e}")))?;
    Ok(text.trim_end_matches('\0').trim())
}
