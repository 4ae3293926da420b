use anyhow::{Context, Result, bail};
use arrow::util::pretty::pretty_format_batches;
use clap::Args;
use porter::{
    CopyRequest, DataFormat, FormatHandler, MemoryStorage, ObjectLocation, ObjectRef, Porter,
    Schema, SchemaField, StoredObject,
};
use porter_arrow::records_to_record_batch;

use crate::location::LocationParser;

#[derive(Args)]
pub struct ShowArgs {
    /// Object location
    location: String,

    /// Maximum number of rows to display
    #[arg(short = 'n', long, default_value_t = 10)]
    limit: usize,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let parser = LocationParser::new();
        let source = parser.parse(&self.location)?;
        let memory = parser.memory();

        // Pull the object into memory records through the normal copy
        // machinery, then render those.
        let porter = Porter::builder()
            .with_default_copiers()
            .with_default_handlers()
            .with_storage(memory.clone())
            .build()?;
        let preview = ObjectLocation::new(memory.clone(), "__preview")
            .with_format(DataFormat::Records);
        porter.copy(&CopyRequest::new(source, preview))?;

        let handler = porter
            .handlers()
            .resolve(DataFormat::Records, porter::StorageEngine::Memory)?;
        let object = ObjectRef::new(memory.as_ref(), "__preview");
        let fields = handler
            .field_names(object)?
            .into_iter()
            .map(|name| {
                let field_type = handler.infer_field_type(object, &name)?;
                Ok(SchemaField::new(name, field_type))
            })
            .collect::<Result<Vec<_>>>()?;
        let schema = Schema::new(fields);

        // Narrow the preview rows so the table shows typed columns.
        handler.cast_schema(object, &schema, &porter::CastOptions::default())?;
        let Some(StoredObject::Records(mut rows)) = memory.get("__preview") else {
            bail!("'{}' did not materialize as records", self.location);
        };
        rows.truncate(self.limit);

        let batch = records_to_record_batch(&schema, &rows)
            .context("failed to build a preview batch")?;
        println!("{}", pretty_format_batches(&[batch])?);
        Ok(())
    }
}
