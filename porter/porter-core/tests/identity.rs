use porter_core::{
    ColumnarTable, Conversion, DataFormat, FieldType, Record, Schema, SchemaField, StorageClass,
    StorageEngine, StorageFormat, Value,
};

#[test]
fn engines_belong_to_one_class_and_declare_schemes() {
    assert_eq!(StorageEngine::Sqlite.class(), StorageClass::Database);
    assert_eq!(StorageEngine::LocalFs.class(), StorageClass::Filesystem);
    assert_eq!(StorageEngine::Memory.class(), StorageClass::Memory);
    assert_eq!(
        StorageEngine::from_scheme("postgresql"),
        Some(StorageEngine::Postgres)
    );
    assert_eq!(StorageEngine::from_scheme("mem"), Some(StorageEngine::Memory));
    assert_eq!(StorageEngine::from_scheme("s3"), None);
}

#[test]
fn natural_formats_match_engine_classes() {
    for engine in [
        StorageEngine::Sqlite,
        StorageEngine::Postgres,
        StorageEngine::Mysql,
        StorageEngine::LocalFs,
        StorageEngine::Memory,
    ] {
        assert_eq!(engine.natural_format().natural_class(), engine.class());
    }
}

#[test]
fn cursor_is_the_only_ephemeral_format() {
    for format in [
        DataFormat::Records,
        DataFormat::Columnar,
        DataFormat::Csv,
        DataFormat::Jsonl,
        DataFormat::Table,
    ] {
        assert!(format.is_storable(), "{format}");
    }
    assert!(!DataFormat::Cursor.is_storable());
}

#[test]
fn storage_format_identity_needs_both_parts_equal() {
    let a = StorageFormat::new(StorageEngine::Memory, DataFormat::Records);
    let b = StorageFormat::new(StorageEngine::Memory, DataFormat::Columnar);
    let c = StorageFormat::new(StorageEngine::LocalFs, DataFormat::Records);
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, StorageFormat::new(StorageEngine::Memory, DataFormat::Records));
    assert!(Conversion::new(a, a).is_identity());
    assert!(!Conversion::new(a, b).is_identity());
}

#[test]
fn field_type_ranks_are_strictly_increasing() {
    let ranks: Vec<u8> = FieldType::ALL.iter().map(FieldType::cardinality_rank).collect();
    assert!(ranks.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(
        FieldType::ALL.last().copied(),
        Some(FieldType::Text),
        "text is the universal fallback and must rank highest"
    );
}

#[test]
fn field_type_names_roundtrip() {
    for ty in FieldType::ALL {
        assert_eq!(FieldType::parse(ty.as_str()), Some(ty));
    }
    assert_eq!(FieldType::parse("varchar"), None);
}

#[test]
fn records_pivot_to_columnar_and_back() {
    let rows = vec![
        Record::new()
            .with_field("a", Value::Int(1))
            .with_field("b", Value::text("x")),
        Record::new().with_field("a", Value::Int(2)),
    ];
    let table = ColumnarTable::from_records(&rows);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.num_columns(), 2);
    // The second record is missing "b": it pivots to null.
    assert_eq!(table.column("b").unwrap()[1], Value::Null);

    let roundtrip = table.to_records();
    assert_eq!(roundtrip[0], rows[0]);
    assert_eq!(roundtrip[1].get("b"), Some(&Value::Null));
}

#[test]
fn schema_lookup_and_display() {
    let schema = Schema::new(vec![
        SchemaField::new("id", FieldType::Int),
        SchemaField::new("name", FieldType::Text),
    ]);
    assert_eq!(schema.field("id").unwrap().field_type, FieldType::Int);
    assert!(schema.field("missing").is_none());
    assert_eq!(schema.to_string(), "id: int\nname: text");
}
