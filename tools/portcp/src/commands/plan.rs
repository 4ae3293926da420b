use anyhow::Result;
use clap::Args;
use porter::{Capability, CopyRequest, Porter};

use crate::location::{LocationParser, parse_format};

#[derive(Args)]
pub struct PlanArgs {
    /// Source location
    source: String,

    /// Destination location
    dest: String,

    /// Target data format (defaults to the destination's natural format)
    #[arg(short, long)]
    format: Option<String>,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let parser = LocationParser::new();
        let source = parser.parse(&self.source)?;
        let mut dest = parser.parse(&self.dest)?;
        if let Some(format) = &self.format {
            dest = dest.with_format(parse_format(format)?);
        }

        let porter = Porter::builder()
            .with_default_copiers()
            .with_default_handlers()
            .with_storage(parser.memory())
            .build()?;
        let path = porter.plan(&CopyRequest::new(source, dest))?;

        if path.is_empty() {
            println!("nothing to do: source and destination storage-format already match");
            return Ok(());
        }
        println!(
            "{} hop(s), total cost {:.0} at {} records",
            path.len(),
            path.total_cost(),
            path.expected_records
        );
        for edge in &path.edges {
            println!("  {} [{}] cost {:.0}", edge.conversion, edge.copier.name(), edge.cost);
        }
        Ok(())
    }
}
