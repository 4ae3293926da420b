//! Sample-based field and schema inference.

use rayon::prelude::*;

use porter_core::{FieldType, Record, Schema, SchemaField, Value};

use crate::detect::{detect, is_maybe};

/// Knobs for inference: which literals count as null, how many records to
/// sample, and the type an all-null field falls back to.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOptions {
    pub null_markers: Vec<String>,
    pub fallback: FieldType,
    pub max_samples: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            null_markers: ["", "null", "NULL", "None", "NA", "N/A"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            fallback: FieldType::Text,
            max_samples: 1_000,
        }
    }
}

impl InferenceOptions {
    pub fn with_null_marker(mut self, marker: impl Into<String>) -> Self {
        self.null_markers.push(marker.into());
        self
    }

    pub fn with_fallback(mut self, fallback: FieldType) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// True nulls plus the configured literal markers.
    pub fn is_nullish(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Text(s) => self.null_markers.iter().any(|m| m == s.as_ref()),
            _ => false,
        }
    }
}

/// Infer the narrowest type covering every non-null sampled value.
///
/// Each value votes for its narrowest detected type; the field's type is
/// the highest-cardinality-rank candidate acceptable to *every* non-null
/// value, widening to `Text` when no candidate covers the whole sample.
/// Nullish values are excluded from the vote; an all-null sample yields
/// `options.fallback`.
pub fn infer_field_type(values: &[&Value], options: &InferenceOptions) -> FieldType {
    let non_null: Vec<&Value> = values
        .iter()
        .copied()
        .filter(|v| !options.is_nullish(v))
        .collect();
    if non_null.is_empty() {
        return options.fallback;
    }

    let mut candidates: Vec<FieldType> = Vec::new();
    for value in &non_null {
        let detected = detect(value);
        if !candidates.contains(&detected) {
            candidates.push(detected);
        }
    }

    candidates
        .into_iter()
        .filter(|ty| non_null.iter().all(|v| is_maybe(*ty, v)))
        .max_by_key(FieldType::cardinality_rank)
        .unwrap_or(FieldType::Text)
}

/// Infer a schema over a record sample. Field order is first-seen order;
/// fields are inferred independently and in parallel. At most
/// `options.max_samples` records are consulted.
pub fn infer_schema(records: &[Record], options: &InferenceOptions) -> Schema {
    let sample = &records[..records.len().min(options.max_samples)];

    let mut field_order: Vec<&str> = Vec::new();
    for record in sample {
        for name in record.field_names() {
            if !field_order.contains(&name) {
                field_order.push(name);
            }
        }
    }

    let fields = field_order
        .par_iter()
        .map(|name| {
            let values: Vec<&Value> = sample.iter().filter_map(|r| r.get(name)).collect();
            SchemaField::new(*name, infer_field_type(&values, options))
        })
        .collect();
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<Value> {
        values.iter().map(Value::text).collect()
    }

    fn infer(values: &[Value]) -> FieldType {
        let refs: Vec<&Value> = values.iter().collect();
        infer_field_type(&refs, &InferenceOptions::default())
    }

    #[test]
    fn uniform_ints_stay_int() {
        assert_eq!(infer(&texts(&["1", "2", "3"])), FieldType::Int);
    }

    #[test]
    fn mixed_int_float_widens_to_float() {
        assert_eq!(infer(&texts(&["1", "2.5"])), FieldType::Float);
    }

    #[test]
    fn int_and_date_widen_to_text() {
        // Neither Int nor Date covers both values, so the field must
        // widen all the way instead of committing to the first match.
        assert_eq!(infer(&texts(&["1", "2020-01-01"])), FieldType::Text);
    }

    #[test]
    fn date_and_datetime_widen_to_datetime() {
        assert_eq!(
            infer(&texts(&["2020-01-01", "2020-01-02T10:30:00"])),
            FieldType::DateTime
        );
    }

    #[test]
    fn native_bool_and_int_widen_to_int() {
        assert_eq!(infer(&[Value::Bool(true), Value::Int(3)]), FieldType::Int);
    }

    #[test]
    fn widening_is_monotonic_in_rank() {
        // Values acceptable only at ranks bool < int < float: the result
        // must carry the maximum rank, never a lower one.
        let inferred = infer(&[Value::Bool(true), Value::Int(2), Value::Float(0.5)]);
        assert_eq!(inferred, FieldType::Float);
        assert!(inferred.cardinality_rank() >= FieldType::Int.cardinality_rank());
    }

    #[test]
    fn nulls_are_excluded_from_the_vote() {
        assert_eq!(
            infer(&[Value::text("1"), Value::Null, Value::text("NA")]),
            FieldType::Int
        );
    }

    #[test]
    fn all_null_sample_uses_fallback() {
        assert_eq!(infer(&[Value::Null, Value::text("")]), FieldType::Text);
        let refs = [Value::Null];
        let opts = InferenceOptions::default().with_fallback(FieldType::Int);
        assert_eq!(infer_field_type(&[&refs[0]], &opts), FieldType::Int);
    }

    #[test]
    fn json_containers_infer_json() {
        assert_eq!(infer(&texts(&[r#"{"a": 1}"#, "[1]"])), FieldType::Json);
    }

    #[test]
    fn schema_inference_covers_all_fields() {
        let records = vec![
            Record::new()
                .with_field("id", Value::text("1"))
                .with_field("name", Value::text("ada")),
            Record::new()
                .with_field("id", Value::text("2"))
                .with_field("name", Value::text("grace"))
                .with_field("joined", Value::text("2021-06-01")),
        ];
        let schema = infer_schema(&records, &InferenceOptions::default());
        assert_eq!(schema.field("id").unwrap().field_type, FieldType::Int);
        assert_eq!(schema.field("name").unwrap().field_type, FieldType::Text);
        assert_eq!(schema.field("joined").unwrap().field_type, FieldType::Date);
    }

    #[test]
    fn schema_inference_respects_sample_cap() {
        let mut records = vec![Record::new().with_field("v", Value::text("1"))];
        records.push(Record::new().with_field("v", Value::text("oops")));
        let opts = InferenceOptions::default().with_max_samples(1);
        let schema = infer_schema(&records, &opts);
        assert_eq!(schema.field("v").unwrap().field_type, FieldType::Int);
    }
}
