//! Flat file codecs: delimited text and JSON lines.
//!
//! Codecs convert between raw bytes and the in-memory [`Record`] shape.
//! CSV reads are untyped — every cell becomes [`Value::Text`] — and
//! narrowing is left to the cast engine. JSON lines carry scalar typing
//! of their own, which is preserved.

use std::io::{Read, Write};

use porter_core::{Record, StorageError, Value};

/// Read a delimited file with a header row into untyped records.
/// Returns the header names alongside the rows so zero-row files still
/// expose their fields.
pub fn read_csv<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Record>), StorageError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| StorageError::Backend(format!("invalid delimited header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| StorageError::Backend(format!("invalid delimited row: {e}")))?;
        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            let cell = row.get(i).unwrap_or_default();
            record.push(header, Value::text(cell));
        }
        records.push(record);
    }
    Ok((headers, records))
}

/// Write records as a delimited file with a header row. Field order
/// comes from `field_names`; missing values and nulls serialize empty.
pub fn write_csv<W: Write>(
    writer: W,
    field_names: &[String],
    records: &[Record],
) -> Result<(), StorageError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(field_names)
        .map_err(|e| StorageError::Backend(format!("delimited write failed: {e}")))?;
    for record in records {
        let row: Vec<String> = field_names
            .iter()
            .map(|name| match record.get(name) {
                Some(Value::Null) | None => String::new(),
                Some(value) => value.to_string(),
            })
            .collect();
        csv_writer
            .write_record(&row)
            .map_err(|e| StorageError::Backend(format!("delimited write failed: {e}")))?;
    }
    csv_writer
        .flush()
        .map_err(|e| StorageError::Backend(format!("delimited write failed: {e}")))?;
    Ok(())
}

/// Read a JSON-lines file: one object per line.
pub fn read_jsonl<R: Read>(mut reader: R) -> Result<Vec<Record>, StorageError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            StorageError::Backend(format!("invalid JSON on line {}: {e}", line_no + 1))
        })?;
        let serde_json::Value::Object(object) = parsed else {
            return Err(StorageError::Backend(format!(
                "line {} is not a JSON object",
                line_no + 1
            )));
        };
        let mut record = Record::new();
        for (key, value) in object {
            record.push(key, json_to_value(value));
        }
        records.push(record);
    }
    Ok(records)
}

/// Write records as JSON lines.
pub fn write_jsonl<W: Write>(
    mut writer: W,
    field_names: &[String],
    records: &[Record],
) -> Result<(), StorageError> {
    for record in records {
        let mut object = serde_json::Map::new();
        for name in field_names {
            let value = record.get(name).cloned().unwrap_or(Value::Null);
            object.insert(name.clone(), value_to_json(&value));
        }
        serde_json::to_writer(&mut writer, &serde_json::Value::Object(object))
            .map_err(|e| StorageError::Backend(format!("JSON write failed: {e}")))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn json_to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::text(s),
        container => Value::Json(container),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Json(v) => v.clone(),
        other => serde_json::Value::String(other.to_string()),
    }
}
