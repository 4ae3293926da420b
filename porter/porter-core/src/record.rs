//! Row- and column-major containers for values in transit.

use std::sync::Arc;

use crate::value::Value;

/// One row: ordered (field name, value) pairs with name lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(Vec<(Arc<str>, Value)>);

impl Record {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_field(mut self, name: impl AsRef<str>, value: Value) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl AsRef<str>, value: Value) {
        self.0.push((Arc::from(name.as_ref()), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0
            .iter_mut()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, value)| value)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self.get_mut(name) {
            Some(slot) => *slot = value,
            None => self.push(name, value),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(field, _)| field.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(field, value)| (field.as_ref(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Arc<str>, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (Arc<str>, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Column-major equivalent of a record batch. Field order is fixed at
/// construction; every column has the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnarTable {
    names: Vec<Arc<str>>,
    columns: Vec<Vec<Value>>,
}

impl ColumnarTable {
    pub fn new(names: Vec<Arc<str>>) -> Self {
        let columns = names.iter().map(|_| Vec::new()).collect();
        Self { names, columns }
    }

    /// Pivot rows into columns. Field order comes from the first record;
    /// fields missing from a later record become nulls.
    pub fn from_records(records: &[Record]) -> Self {
        let names: Vec<Arc<str>> = match records.first() {
            Some(first) => first.field_names().map(Arc::from).collect(),
            None => Vec::new(),
        };
        let mut table = Self::new(names);
        for record in records {
            let row = table
                .names
                .iter()
                .map(|name| record.get(name).cloned().unwrap_or(Value::Null))
                .collect();
            table.push_row(row);
        }
        table
    }

    /// Pivot back into rows, preserving field order.
    pub fn to_records(&self) -> Vec<Record> {
        (0..self.num_rows())
            .map(|row| {
                self.names
                    .iter()
                    .enumerate()
                    .map(|(col, name)| (Arc::clone(name), self.columns[col][row].clone()))
                    .collect()
            })
            .collect()
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.names.len());
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_ref())
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.names
            .iter()
            .position(|field| field.as_ref() == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn num_columns(&self) -> usize {
        self.names.len()
    }
}

/// What the in-process memory storage holds under one name.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredObject {
    Records(Vec<Record>),
    Columnar(ColumnarTable),
    Bytes(Arc<[u8]>),
}

impl StoredObject {
    pub fn record_count(&self) -> u64 {
        match self {
            Self::Records(rows) => rows.len() as u64,
            Self::Columnar(table) => table.num_rows() as u64,
            Self::Bytes(_) => 0,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Records(_) => "Records",
            Self::Columnar(_) => "Columnar",
            Self::Bytes(_) => "Bytes",
        }
    }
}
