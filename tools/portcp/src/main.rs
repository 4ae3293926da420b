mod commands;
mod location;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{copy::CopyArgs, plan::PlanArgs, schema::SchemaArgs, show::ShowArgs};

#[derive(Parser)]
#[command(name = "portcp", about = "Copy data objects between storages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy an object to another storage/format
    Copy(CopyArgs),
    /// Show the planned conversion path without executing it
    Plan(PlanArgs),
    /// Print the inferred schema of an object
    Schema(SchemaArgs),
    /// Preview an object's rows as a table
    Show(ShowArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Copy(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Schema(args) => args.run(),
        Commands::Show(args) => args.run(),
    }
}
