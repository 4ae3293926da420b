use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, TimeUnit};
use porter_core::{FieldType, Schema};

/// Arrow data type for one logical field type.
///
/// `Decimal` keeps its exact digit string and `Json` its serialized
/// text, so both map to `Utf8`.
pub fn field_type_to_arrow(field_type: FieldType) -> DataType {
    match field_type {
        FieldType::Bool => DataType::Boolean,
        FieldType::Int => DataType::Int64,
        FieldType::Float => DataType::Float64,
        FieldType::Decimal => DataType::Utf8,
        FieldType::Time => DataType::Time64(TimeUnit::Nanosecond),
        FieldType::Date => DataType::Date32,
        FieldType::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
        FieldType::Json => DataType::Utf8,
        FieldType::Bytes => DataType::Binary,
        FieldType::Text => DataType::Utf8,
    }
}

/// Convert a `porter` schema into an Arrow schema. Every field is
/// nullable: null markers are a cast-engine concern, not a schema one.
pub fn schema_to_arrow(schema: &Schema) -> ArrowSchema {
    let fields: Vec<Field> = schema
        .iter()
        .map(|f| Field::new(f.name.as_ref(), field_type_to_arrow(f.field_type), true))
        .collect();
    ArrowSchema::new(fields)
}
