use std::{
    fmt::{Display, Formatter, Result},
    ops::Deref,
    sync::Arc,
};

use crate::field_type::FieldType;

/// One declared field: name plus logical type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: Arc<str>,
    pub field_type: FieldType,
}

impl SchemaField {
    pub fn new(name: impl AsRef<str>, field_type: FieldType) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            field_type,
        }
    }
}

/// Ordered field list used for casting and empty-object creation.
/// Opaque beyond field iteration and name lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema(pub Vec<SchemaField>);

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self(fields)
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.0.iter().find(|field| field.name.as_ref() == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|field| field.name.as_ref())
    }

    pub fn as_slice(&self) -> &[SchemaField] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaField> {
        self.0.iter()
    }
}

impl From<Vec<SchemaField>> for Schema {
    fn from(value: Vec<SchemaField>) -> Self {
        Self(value)
    }
}

impl From<Schema> for Vec<SchemaField> {
    fn from(value: Schema) -> Self {
        value.0
    }
}

impl AsRef<[SchemaField]> for Schema {
    fn as_ref(&self) -> &[SchemaField] {
        self.as_slice()
    }
}

impl Deref for Schema {
    type Target = [SchemaField];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field.name, field.field_type)?;
        }
        Ok(())
    }
}
