use anyhow::{Context, Result};
use clap::Args;
use porter::{FormatHandler, ObjectRef, Porter, Schema, SchemaField, Storage};

use crate::location::{LocationParser, parse_format};

#[derive(Args)]
pub struct SchemaArgs {
    /// Object location (e.g. file://data/in.csv)
    location: String,

    /// Data format of the object (sniffed if not given)
    #[arg(short, long)]
    format: Option<String>,

    /// Print the schema as its Arrow equivalent
    #[arg(long)]
    arrow: bool,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let parser = LocationParser::new();
        let location = parser.parse(&self.location)?;

        let porter = Porter::builder().with_default_handlers().build()?;
        let object = ObjectRef::new(location.storage.as_ref(), &location.name);
        let format = match &self.format {
            Some(format) => parse_format(format)?,
            None => porter
                .handlers()
                .sniff(object)?
                .with_context(|| format!("cannot determine the format of '{}'", self.location))?,
        };

        let handler = porter.handlers().resolve(format, location.storage.engine())?;
        let fields = handler
            .field_names(object)?
            .into_iter()
            .map(|name| {
                let field_type = handler.infer_field_type(object, &name)?;
                Ok(SchemaField::new(name, field_type))
            })
            .collect::<Result<Vec<_>>>()?;
        let schema = Schema::new(fields);

        if self.arrow {
            println!("{:#?}", porter_arrow::schema_to_arrow(&schema));
        } else {
            println!("{schema}");
        }
        Ok(())
    }
}
