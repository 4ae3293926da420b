//! Build Arrow arrays from rows or columns of scalar values.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    Time64NanosecondArray, TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, Timelike};
use porter_core::{ColumnarTable, FieldType, Record, Schema, Value};

use crate::ArrowBridgeError;
use crate::schema::schema_to_arrow;

/// Convert row records into a [`RecordBatch`] with `schema`'s columns.
/// Fields missing from a record become nulls.
pub fn records_to_record_batch(
    schema: &Schema,
    rows: &[Record],
) -> Result<RecordBatch, ArrowBridgeError> {
    let arrow_schema = Arc::new(schema_to_arrow(schema));
    let null = Value::Null;
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.len());
    for field in schema.iter() {
        let values: Vec<&Value> = rows
            .iter()
            .map(|row| row.get(&field.name).unwrap_or(&null))
            .collect();
        arrays.push(build_array(&field.name, field.field_type, &values)?);
    }
    Ok(RecordBatch::try_new(arrow_schema, arrays)
        .expect("arrays match the schema by construction"))
}

/// Convert a columnar table into a [`RecordBatch`]. The schema decides
/// which columns appear and how they are typed; a column absent from the
/// table is all nulls.
pub fn columnar_to_record_batch(
    schema: &Schema,
    table: &ColumnarTable,
) -> Result<RecordBatch, ArrowBridgeError> {
    let arrow_schema = Arc::new(schema_to_arrow(schema));
    let rows = table.num_rows();
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.len());
    for field in schema.iter() {
        let null = Value::Null;
        let values: Vec<&Value> = match table.column(&field.name) {
            Some(column) => column.iter().collect(),
            None => vec![&null; rows],
        };
        arrays.push(build_array(&field.name, field.field_type, &values)?);
    }
    Ok(RecordBatch::try_new(arrow_schema, arrays)
        .expect("arrays match the schema by construction"))
}

fn mismatch(field: &str, expected: FieldType, value: &Value) -> ArrowBridgeError {
    ArrowBridgeError {
        field: field.to_string(),
        expected,
        actual: value.variant_name(),
    }
}

fn build_array(
    field: &str,
    field_type: FieldType,
    values: &[&Value],
) -> Result<ArrayRef, ArrowBridgeError> {
    Ok(match field_type {
        FieldType::Bool => {
            let cells: Vec<Option<bool>> = values
                .iter()
                .map(|v| v.try_bool().map_err(|_| mismatch(field, field_type, v)))
                .collect::<Result<_, _>>()?;
            Arc::new(BooleanArray::from(cells))
        }
        FieldType::Int => {
            let cells: Vec<Option<i64>> = values
                .iter()
                .map(|v| v.try_int().map_err(|_| mismatch(field, field_type, v)))
                .collect::<Result<_, _>>()?;
            Arc::new(Int64Array::from(cells))
        }
        FieldType::Float => {
            let cells: Vec<Option<f64>> = values
                .iter()
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Float(f) => Ok(Some(*f)),
                    Value::Int(i) => Ok(Some(*i as f64)),
                    other => Err(mismatch(field, field_type, other)),
                })
                .collect::<Result<_, _>>()?;
            Arc::new(Float64Array::from(cells))
        }
        FieldType::Date => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid");
            let cells: Vec<Option<i32>> = values
                .iter()
                .map(|v| {
                    let date = v.try_date().map_err(|_| mismatch(field, field_type, v))?;
                    Ok(date.map(|d| d.signed_duration_since(epoch).num_days() as i32))
                })
                .collect::<Result<_, _>>()?;
            Arc::new(Date32Array::from(cells))
        }
        FieldType::Time => {
            let cells: Vec<Option<i64>> = values
                .iter()
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Time(t) => Ok(Some(
                        i64::from(t.num_seconds_from_midnight()) * 1_000_000_000
                            + i64::from(t.nanosecond()),
                    )),
                    other => Err(mismatch(field, field_type, other)),
                })
                .collect::<Result<_, _>>()?;
            Arc::new(Time64NanosecondArray::from(cells))
        }
        FieldType::DateTime => {
            let cells: Vec<Option<i64>> = values
                .iter()
                .map(|v| {
                    let dt = v.try_datetime().map_err(|_| mismatch(field, field_type, v))?;
                    Ok(dt.map(|dt| dt.and_utc().timestamp_micros()))
                })
                .collect::<Result<_, _>>()?;
            Arc::new(TimestampMicrosecondArray::from(cells))
        }
        FieldType::Bytes => {
            let cells: Vec<Option<&[u8]>> = values
                .iter()
                .map(|v| v.try_bytes().map_err(|_| mismatch(field, field_type, v)))
                .collect::<Result<_, _>>()?;
            Arc::new(BinaryArray::from_opt_vec(cells))
        }
        // Decimal and Json keep their textual forms; Text takes any
        // scalar's display form.
        FieldType::Decimal | FieldType::Json | FieldType::Text => {
            let cells: Vec<Option<String>> = values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Arc::new(StringArray::from(cells))
        }
    })
}

#[cfg(test)]
mod tests {
    use arrow::array::Array;
    use porter_core::SchemaField;

    use super::*;

    #[test]
    fn builds_typed_columns_with_nulls() {
        let schema = Schema::new(vec![
            SchemaField::new("id", FieldType::Int),
            SchemaField::new("name", FieldType::Text),
        ]);
        let rows = vec![
            Record::new()
                .with_field("id", Value::Int(1))
                .with_field("name", Value::text("ada")),
            Record::new().with_field("id", Value::Null),
        ];
        let batch = records_to_record_batch(&schema, &rows).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.column(0).null_count(), 1);
        // "name" is missing entirely from the second record.
        assert_eq!(batch.column(1).null_count(), 1);
    }

    #[test]
    fn mismatched_cell_names_the_field() {
        let schema = Schema::new(vec![SchemaField::new("id", FieldType::Int)]);
        let rows = vec![Record::new().with_field("id", Value::text("not-an-int"))];
        let err = records_to_record_batch(&schema, &rows).unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.expected, FieldType::Int);
    }

    #[test]
    fn columnar_tables_convert_column_wise() {
        let rows = vec![
            Record::new().with_field("x", Value::Float(0.5)),
            Record::new().with_field("x", Value::Float(1.5)),
        ];
        let table = ColumnarTable::from_records(&rows);
        let schema = Schema::new(vec![SchemaField::new("x", FieldType::Float)]);
        let batch = columnar_to_record_batch(&schema, &table).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.column(0).null_count(), 0);
    }
}
