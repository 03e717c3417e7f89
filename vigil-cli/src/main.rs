//! Vigil object runtime CLI
//!
//! Inspects the type registry and instantiates objects from JSON
//! declarations.
//!
//! Usage:
//!   vigil types
//!   vigil create Host
//!   vigil load objects.json

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;
use vigil_cli::{bootstrap, create_object, describe_types, load_declarations, render_objects};

#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Inspect the Vigil type registry and instantiate objects")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered types and their fields
    Types,

    /// Create a default object of a type and print it
    Create {
        /// Registered type name
        type_name: String,
    },

    /// Load object declarations from a JSON file and print them back
    Load {
        /// File holding one declaration or an array of them
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let registry = bootstrap()?;
    debug!(command = ?args.command, "Running command");

    let output = match args.command {
        Command::Types => serde_json::to_value(describe_types(&registry))?,
        Command::Create { type_name } => create_object(&registry, &type_name)?,
        Command::Load { file } => render_objects(&load_declarations(&registry, &file)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
