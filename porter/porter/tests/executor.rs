//! Executor behavior: cancellation, dispositions, and landing choices.

mod support;

use std::sync::Arc;

use porter::{
    CancelToken, CopyError, CopyRequest, DataFormat, DatabaseStorage, MemoryStorage, MemoryStore,
    ObjectLocation, Porter, Record, StoredObject, Value, WriteDisposition,
};
use support::FakeDatabase;

fn sample_rows() -> Vec<Record> {
    vec![
        Record::new().with_field("n", Value::Int(1)),
        Record::new().with_field("n", Value::Int(2)),
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
fn pre_cancelled_request_runs_no_hops() {
    let memory = Arc::new(MemoryStore::new("mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Sqlite));
    memory.put("rows", StoredObject::Records(sample_rows()));

    let cancel = CancelToken::new();
    cancel.cancel();
    let porter = engine_with(&[memory.clone() as _, db.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(memory, "rows"),
        ObjectLocation::new(db.clone(), "rows"),
    )
    .with_cancel_token(cancel);

    let err = porter.copy(&request).unwrap_err();
    assert!(matches!(err, CopyError::Cancelled { hop: 0 }));
    assert!(!db.table_exists("rows").unwrap());
}

#[test]
fn append_disposition_accumulates_rows() {
    let memory = Arc::new(MemoryStore::new("mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Sqlite));
    memory.put("rows", StoredObject::Records(sample_rows()));

    let porter = engine_with(&[memory.clone() as _, db.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(memory, "rows"),
        ObjectLocation::new(db.clone(), "rows"),
    )
    .with_disposition(WriteDisposition::Append);

    porter.copy(&request).unwrap();
    porter.copy(&request).unwrap();
    assert_eq!(db.rows("rows").unwrap().len(), 4);
}

#[test]
fn overwrite_disposition_replaces_the_destination() {
    let memory = Arc::new(MemoryStore::new("mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Sqlite));
    memory.put("rows", StoredObject::Records(sample_rows()));

    let porter = engine_with(&[memory.clone() as _, db.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(memory, "rows"),
        ObjectLocation::new(db.clone(), "rows"),
    )
    .with_disposition(WriteDisposition::Overwrite);

    porter.copy(&request).unwrap();
    porter.copy(&request).unwrap();
    assert_eq!(db.rows("rows").unwrap().len(), 2);
}

#[test]
fn intermediates_land_on_the_destination_storage_when_engines_match() {
    let memory = Arc::new(MemoryStore::new("request-mem"));
    let db = Arc::new(FakeDatabase::new("db", porter::StorageEngine::Postgres));
    let other_memory = Arc::new(MemoryStore::new("engine-mem"));
    db.insert_table(
        "t",
        porter::Schema::new(vec![porter::SchemaField::new("n", porter::FieldType::Int)]),
        sample_rows(),
    );

    // Destination is itself a memory storage; the table→records hop must
    // land there, not on the engine's own staging store.
    let porter = engine_with(&[db.clone() as _, other_memory.clone() as _]);
    let request = CopyRequest::new(
        ObjectLocation::new(db, "t"),
        ObjectLocation::new(memory.clone(), "t").with_format(DataFormat::Records),
    );
    porter.copy(&request).unwrap();
    assert!(memory.exists("t"));
    assert!(other_memory.is_empty());
}
