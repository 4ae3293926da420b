use anyhow::Result;
use clap::{Args, ValueEnum};
use indicatif::ProgressBar;
use porter::{CastOptions, CopyRequest, ErrorBehavior, Porter, WriteDisposition};

use crate::location::{LocationParser, parse_format, parse_schema};

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum CastPolicy {
    /// Abort the copy on the first value that will not cast
    Fail,
    /// Widen the declared type to one the values actually satisfy
    Relax,
    /// Replace offending values with null
    Null,
}

impl From<CastPolicy> for ErrorBehavior {
    fn from(policy: CastPolicy) -> Self {
        match policy {
            CastPolicy::Fail => ErrorBehavior::Fail,
            CastPolicy::Relax => ErrorBehavior::RelaxType,
            CastPolicy::Null => ErrorBehavior::SetNull,
        }
    }
}

#[derive(Args)]
pub struct CopyArgs {
    /// Source location (e.g. file://data/in.csv, mem://rows)
    source: String,

    /// Destination location
    dest: String,

    /// Target data format (defaults to the destination's natural format)
    #[arg(short, long)]
    format: Option<String>,

    /// Schema to enforce on arrival, as name:type pairs
    #[arg(short, long)]
    schema: Option<String>,

    /// Overwrite an existing destination object
    #[arg(long)]
    overwrite: bool,

    /// Append to an existing destination object
    #[arg(long, conflicts_with = "overwrite")]
    append: bool,

    /// What to do when a value will not cast to its declared type
    #[arg(long, value_enum, default_value_t = CastPolicy::Fail)]
    on_cast_error: CastPolicy,
}

impl CopyArgs {
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

        let mut request = CopyRequest::new(source, dest)
            .with_cast_options(CastOptions::default().with_behavior(self.on_cast_error.into()));
        if let Some(schema) = &self.schema {
            request = request.with_schema(parse_schema(schema)?);
        }
        if self.overwrite {
            request = request.with_disposition(WriteDisposition::Overwrite);
        } else if self.append {
            request = request.with_disposition(WriteDisposition::Append);
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("{} -> {}", self.source, self.dest));
        let report = porter.copy(&request)?;
        spinner.finish_and_clear();

        println!(
            "copied in {} hop(s), cost {:.0} at {} records",
            report.conversions.len(),
            report.total_cost,
            report.expected_records
        );
        for conversion in &report.conversions {
            println!("  {conversion}");
        }
        Ok(())
    }
}
