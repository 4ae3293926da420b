//! Value coercion into target field types.

use std::sync::Arc;

use porter_core::{FieldType, Value};

use crate::detect::{is_definitely, parse_date, parse_datetime, parse_time, strip_commas};
use crate::error::CastError;
use crate::infer::InferenceOptions;

/// How strictly [`cast_value`] treats values that are not already the
/// native representation of the target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastMode {
    /// Refuse anything that is not already the native representation.
    Strict,
    /// Best-effort coercion: parse strings, widen along the numeric
    /// chain, strip currency-style commas before parsing numbers.
    #[default]
    Lenient,
}

/// Cast a single value to `target`.
///
/// Nullish input (true nulls plus `options.null_markers` literals) always
/// casts to `Value::Null`. A value already of the target type is returned
/// unchanged in both modes.
pub fn cast_value(
    value: &Value,
    target: FieldType,
    mode: CastMode,
    options: &InferenceOptions,
) -> Result<Value, CastError> {
    if options.is_nullish(value) {
        return Ok(Value::Null);
    }
    if is_definitely(target, value) || (target == FieldType::Text && matches!(value, Value::Text(_)))
    {
        return Ok(value.clone());
    }
    if mode == CastMode::Strict {
        return Err(CastError::strict(value, target));
    }
    lenient_cast(value, target).ok_or_else(|| CastError::lenient(value, target))
}

fn lenient_cast(value: &Value, target: FieldType) -> Option<Value> {
    match target {
        FieldType::Bool => match value {
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
            Value::Int(0) => Some(Value::Bool(false)),
            Value::Int(1) => Some(Value::Bool(true)),
            _ => None,
        },
        FieldType::Int => match value {
            Value::Bool(b) => Some(Value::Int(i64::from(*b))),
            Value::Float(f) if f.fract() == 0.0 => Some(Value::Int(*f as i64)),
            Value::Text(s) => strip_commas(s.trim()).parse::<i64>().ok().map(Value::Int),
            Value::Decimal(s) => s.parse::<i64>().ok().map(Value::Int),
            _ => None,
        },
        FieldType::Float => match value {
            Value::Bool(b) => Some(Value::Float(f64::from(u8::from(*b)))),
            Value::Int(i) => Some(Value::Float(*i as f64)),
            Value::Decimal(s) => s.parse::<f64>().ok().map(Value::Float),
            Value::Text(s) => strip_commas(s.trim()).parse::<f64>().ok().map(Value::Float),
            _ => None,
        },
        FieldType::Decimal => match value {
            Value::Bool(b) => Some(Value::decimal(if *b { "1" } else { "0" })),
            Value::Int(i) => Some(Value::decimal(i.to_string())),
            Value::Float(f) => Some(Value::decimal(f.to_string())),
            Value::Text(s) => {
                let stripped = strip_commas(s.trim());
                is_decimal_literal(&stripped).then(|| Value::decimal(stripped))
            }
            _ => None,
        },
        FieldType::Time => match value {
            Value::Text(s) => parse_time(s).map(Value::Time),
            _ => None,
        },
        FieldType::Date => match value {
            Value::Text(s) => parse_date(s).map(Value::Date),
            _ => None,
        },
        FieldType::DateTime => match value {
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(Value::DateTime),
            Value::Text(s) => parse_datetime(s)
                .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
                .map(Value::DateTime),
            _ => None,
        },
        FieldType::Json => match value {
            Value::Text(s) => serde_json::from_str(s).ok().map(Value::Json),
            _ => None,
        },
        FieldType::Bytes => match value {
            Value::Text(s) => Some(Value::Bytes(Arc::from(s.as_bytes()))),
            _ => None,
        },
        FieldType::Text => Some(match value {
            Value::Bytes(b) => Value::text(String::from_utf8_lossy(b)),
            other => Value::text(other.to_string()),
        }),
    }
}

/// Optional sign, digits, optional fractional digits. Exponents are left
/// to Float.
fn is_decimal_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() {
        return false;
    }
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.is_none_or(all_digits)
}
