//! End-to-end copy scenarios across memory, filesystem, and database
//! storages.

mod support;

use std::io::{Read, Write};
use std::sync::Arc;

use porter::{
    CopyError, CopyRequest, DataFormat, DatabaseStorage, FieldType, FilesystemStorage,
    FormatHandler, LocalFs, MemoryStorage, MemoryStore, ObjectLocation, ObjectRef, PlanError,
    Porter, Record, Schema, SchemaField, StoredObject, Value,
};
use support::FakeDatabase;

fn people_rows() -> Vec<Record> {
    vec![
        Record::new()
            .with_field("f1", Value::text("hello"))
            .with_field("f2", Value::Int(1)),
        Record::new()
            .with_field("f1", Value::text("world"))
            .with_field("f2", Value::Int(2)),
    ]
}

fn engine_with(storages: &[Arc<dyn porter::Storage>]) -> Porter {
    let mut builder = Porter::builder()
        .with_default_copiers()
        .with_default_handlers();
    for storage in storages {
        builder = builder.with_storage(Arc::clone(storage));
    }
    builder.build().expect("builtin copiers are constrained")
}

#[test]
fn records_into_a_fresh_database_table() {
    let memory = Arc::new(MemoryStore::new("mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Sqlite));
    memory.put("people", StoredObject::Records(people_rows()));

    let porter = engine_with(&[memory.clone() as _, db.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(memory, "people"),
        ObjectLocation::new(db.clone(), "people"),
    );

    let report = porter.copy(&request).unwrap();
    assert_eq!(report.conversions.len(), 1);
    assert_eq!(report.expected_records, 2);

    let rows = db.rows("people").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("f1"), Some(&Value::text("hello")));
    assert_eq!(rows[0].get("f2"), Some(&Value::Int(1)));
    assert_eq!(rows[1].get("f2"), Some(&Value::Int(2)));
}

#[test]
fn csv_lands_untyped_then_casts_by_schema() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Arc::new(LocalFs::new(dir.path()));
    let memory = Arc::new(MemoryStore::new("mem"));
    fs.create("input.csv", false)
        .unwrap()
        .write_all(b"f1,f2\nhi,2\n")
        .unwrap();

    let porter = engine_with(&[fs.clone() as _, memory.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(fs, "input.csv"),
        ObjectLocation::new(memory.clone(), "landed").with_format(DataFormat::Records),
    );
    let report = porter.copy(&request).unwrap();
    assert_eq!(report.conversions.len(), 1);

    // Prior to any schema cast every cell is text.
    let Some(StoredObject::Records(rows)) = memory.get("landed") else {
        panic!("landed object missing");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("f1"), Some(&Value::text("hi")));
    assert_eq!(rows[0].get("f2"), Some(&Value::text("2")));

    // cast_schema narrows f2 to the declared integer type.
    let schema = Schema::new(vec![
        SchemaField::new("f1", FieldType::Text),
        SchemaField::new("f2", FieldType::Int),
    ]);
    let handler = porter
        .handlers()
        .resolve(DataFormat::Records, porter::StorageEngine::Memory)
        .unwrap();
    handler
        .cast_schema(
            ObjectRef::new(memory.as_ref(), "landed"),
            &schema,
            &porter::CastOptions::default(),
        )
        .unwrap();
    let Some(StoredObject::Records(rows)) = memory.get("landed") else {
        panic!("landed object missing");
    };
    assert_eq!(rows[0].get("f1"), Some(&Value::text("hi")));
    assert_eq!(rows[0].get("f2"), Some(&Value::Int(2)));
}

#[test]
fn csv_copy_with_schema_casts_on_arrival() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Arc::new(LocalFs::new(dir.path()));
    let memory = Arc::new(MemoryStore::new("mem"));
    fs.create("input.csv", false)
        .unwrap()
        .write_all(b"f1,f2\nhi,2\n")
        .unwrap();

    let porter = engine_with(&[fs.clone() as _, memory.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(fs, "input.csv"),
        ObjectLocation::new(memory.clone(), "typed").with_format(DataFormat::Records),
    )
    .with_schema(Schema::new(vec![
        SchemaField::new("f1", FieldType::Text),
        SchemaField::new("f2", FieldType::Int),
    ]));
    porter.copy(&request).unwrap();

    let Some(StoredObject::Records(rows)) = memory.get("typed") else {
        panic!("typed object missing");
    };
    assert_eq!(rows[0].get("f2"), Some(&Value::Int(2)));
}

#[test]
fn database_to_file_goes_through_records_and_cleans_up() {
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Postgres));
    db.insert_table(
        "events",
        Schema::new(vec![
            SchemaField::new("id", FieldType::Int),
            SchemaField::new("kind", FieldType::Text),
        ]),
        vec![
            Record::new()
                .with_field("id", Value::Int(1))
                .with_field("kind", Value::text("click")),
            Record::new()
                .with_field("id", Value::Int(2))
                .with_field("kind", Value::text("view")),
        ],
    );
    let dir = tempfile::tempdir().unwrap();
    let fs = Arc::new(LocalFs::new(dir.path()));
    let staging = Arc::new(MemoryStore::new("staging"));

    let porter = engine_with(&[db.clone() as _, fs.clone() as _, staging.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(db, "events"),
        ObjectLocation::new(fs.clone(), "events.csv"),
    );
    let report = porter.copy(&request).unwrap();

    // No single copier bridges database to file, so the plan stages on
    // memory records.
    assert_eq!(report.conversions.len(), 2);
    assert_eq!(report.conversions[0].to.format, DataFormat::Records);
    assert_eq!(report.conversions[1].to.format, DataFormat::Csv);

    let mut contents = String::new();
    fs.open_read("events.csv")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "id,kind\n1,click\n2,view\n");

    // The staged intermediate was released once consumed.
    assert!(staging.is_empty());
}

#[test]
fn no_registered_route_is_a_planning_failure() {
    let memory = Arc::new(MemoryStore::new("mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Sqlite));
    memory.put("people", StoredObject::Records(people_rows()));

    // Handlers only; not a single copier registered.
    let porter = Porter::builder()
        .with_default_handlers()
        .with_storage(memory.clone() as _)
        .with_storage(db.clone() as _)
        .build()
        .unwrap();
    let request = CopyRequest::new(
        ObjectLocation::new(memory, "people"),
        ObjectLocation::new(db.clone(), "people"),
    );
    let err = porter.copy(&request).unwrap_err();
    let CopyError::Plan(PlanError::NoRoute { from, to }) = err else {
        panic!("expected NoRoute, got {err}");
    };
    assert_eq!(from.format, DataFormat::Records);
    assert_eq!(to.format, DataFormat::Table);
    // The executor never ran: nothing was created.
    assert!(!db.table_exists("people").unwrap());
}

#[test]
fn same_storage_format_is_a_completed_no_op() {
    let memory = Arc::new(MemoryStore::new("mem"));
    memory.put("people", StoredObject::Records(people_rows()));

    let porter = engine_with(&[memory.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(memory.clone(), "people").with_format(DataFormat::Records),
        ObjectLocation::new(memory.clone(), "elsewhere").with_format(DataFormat::Records),
    );
    let report = porter.copy(&request).unwrap();
    assert!(report.conversions.is_empty());
    assert_eq!(report.total_cost, 0.0);
    // Zero hops means zero work; no new object appears.
    assert!(!memory.exists("elsewhere"));
}

#[test]
fn existing_destination_is_refused_by_default() {
    let memory = Arc::new(MemoryStore::new("mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Sqlite));
    memory.put("people", StoredObject::Records(people_rows()));
    db.insert_table("people", Schema::default(), Vec::new());

    let porter = engine_with(&[memory.clone() as _, db.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(memory, "people"),
        ObjectLocation::new(db, "people"),
    );
    assert!(matches!(
        porter.copy(&request).unwrap_err(),
        CopyError::ObjectExists { .. }
    ));
}

#[test]
fn records_pivot_to_columnar_and_back() {
    let memory = Arc::new(MemoryStore::new("mem"));
    memory.put("rows", StoredObject::Records(people_rows()));

    let porter = engine_with(&[memory.clone() as _]);
    porter
        .copy(&CopyRequest::new(
            ObjectLocation::new(memory.clone(), "rows"),
            ObjectLocation::new(memory.clone(), "cols").with_format(DataFormat::Columnar),
        ))
        .unwrap();
    let Some(StoredObject::Columnar(table)) = memory.get("cols") else {
        panic!("columnar object missing");
    };
    assert_eq!(table.num_rows(), 2);

    porter
        .copy(&CopyRequest::new(
            ObjectLocation::new(memory.clone(), "cols").with_format(DataFormat::Columnar),
            ObjectLocation::new(memory.clone(), "rows-again").with_format(DataFormat::Records),
        ))
        .unwrap();
    let Some(StoredObject::Records(rows)) = memory.get("rows-again") else {
        panic!("records object missing");
    };
    assert_eq!(rows, people_rows());
}
