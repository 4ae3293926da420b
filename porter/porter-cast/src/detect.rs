//! Per-type value detection: definite structural matches and permissive
//! string-parseable matches.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use porter_core::{FieldType, Value};

/// Unambiguous structural match: the value already is the native
/// representation of `ty`. Text is never a definite match — untyped
/// sources produce text for everything, and committing to `Text` here
/// would stop narrowing before it starts.
pub fn is_definitely(ty: FieldType, value: &Value) -> bool {
    match ty {
        FieldType::Bool => matches!(value, Value::Bool(_)),
        FieldType::Int => matches!(value, Value::Int(_)),
        FieldType::Float => matches!(value, Value::Float(_)),
        FieldType::Decimal => matches!(value, Value::Decimal(_)),
        FieldType::Time => matches!(value, Value::Time(_)),
        FieldType::Date => matches!(value, Value::Date(_)),
        FieldType::DateTime => matches!(value, Value::DateTime(_)),
        FieldType::Json => matches!(value, Value::Json(_)),
        FieldType::Bytes => matches!(value, Value::Bytes(_)),
        FieldType::Text => false,
    }
}

/// Permissive match: the value is either definitely `ty`, a value of a
/// narrower type on the same widening chain, or a string that parses as
/// `ty`. `is_maybe` is a superset of [`is_definitely`] for every type
/// except `Text`, which accepts everything.
pub fn is_maybe(ty: FieldType, value: &Value) -> bool {
    if is_definitely(ty, value) {
        return true;
    }
    match ty {
        FieldType::Bool => as_text(value).is_some_and(parses_bool),
        FieldType::Int => {
            matches!(value, Value::Bool(_)) || as_text(value).is_some_and(parses_int)
        }
        FieldType::Float => {
            is_maybe(FieldType::Int, value)
                || matches!(value, Value::Float(_))
                || as_text(value).is_some_and(parses_float)
        }
        FieldType::Decimal => is_maybe(FieldType::Float, value),
        FieldType::Time => as_text(value).is_some_and(|s| parse_time(s).is_some()),
        FieldType::Date => as_text(value).is_some_and(|s| parse_date(s).is_some()),
        FieldType::DateTime => {
            matches!(value, Value::Date(_))
                || as_text(value)
                    .is_some_and(|s| parse_datetime(s).is_some() || parse_date(s).is_some())
        }
        FieldType::Json => as_text(value).is_some_and(parses_json_container),
        FieldType::Bytes => matches!(value, Value::Text(_)),
        FieldType::Text => true,
    }
}

/// Narrowest type for one value: first definite match in ascending rank
/// order, else first maybe match, else `Text`.
pub fn detect(value: &Value) -> FieldType {
    for ty in FieldType::ALL {
        if is_definitely(ty, value) {
            return ty;
        }
    }
    for ty in FieldType::ALL {
        if is_maybe(ty, value) {
            return ty;
        }
    }
    FieldType::Text
}

fn as_text(value: &Value) -> Option<&str> {
    match value {
        Value::Text(s) => Some(s.as_ref()),
        _ => None,
    }
}

fn parses_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
}

/// Currency-style ASCII commas are ignored when parsing numbers.
pub(crate) fn strip_commas(s: &str) -> String {
    s.chars().filter(|c| *c != ',').collect()
}

fn parses_int(s: &str) -> bool {
    strip_commas(s.trim()).parse::<i64>().is_ok()
}

fn parses_float(s: &str) -> bool {
    strip_commas(s.trim()).parse::<f64>().is_ok()
}

pub(crate) fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// JSON candidacy requires an unambiguous container shape. Bare JSON
/// scalars ("1", "true") must keep voting for their scalar types.
fn parses_json_container(s: &str) -> bool {
    let trimmed = s.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(s).is_ok()
}
