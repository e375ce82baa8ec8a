//! Command-line interface for schema-datagen
//!
//! # Usage Examples
//!
//! ```bash
//! # JSON Lines to stdout, seed taken from the schema document
//! schema-datagen generate --schema tests/fixtures/record.yaml --count 5
//!
//! # Deterministic file output
//! SCHEMA_DATAGEN_SEED=42 schema-datagen generate \
//!   --schema tests/fixtures/geojson.yaml \
//!   --count 1000 \
//!   --output features.jsonl
//!
//! # Contract check only
//! schema-datagen validate --schema tests/fixtures/citm.yaml
//!
//! # Encode, parse, decode and compare
//! RUST_LOG=info schema-datagen roundtrip --schema tests/fixtures/record.yaml --count 500
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use datagen_core::SchemaDocument;
use datagen_engine::DataGenerator;
use schema_datagen::{run_roundtrip, JsonlPopulator};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "schema-datagen")]
#[command(about = "Generate randomized values from a schema and round-trip them through JSON")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by the commands that generate values.
#[derive(Args, Clone, Debug)]
struct GenerateArgs {
    /// Path to schema YAML file
    #[arg(long, short = 's')]
    schema: PathBuf,

    /// Random seed (overrides the document's seed; OS-seeded when neither is set)
    #[arg(long, env = "SCHEMA_DATAGEN_SEED")]
    seed: Option<u64>,

    /// Number of values to generate
    #[arg(long, short = 'n', default_value = "10")]
    count: u64,

    /// Collection size bound (overrides the document's options)
    #[arg(long)]
    max_collection_size: Option<usize>,
}

impl GenerateArgs {
    fn load(&self) -> anyhow::Result<DataGenerator> {
        let mut document = SchemaDocument::from_file(&self.schema)
            .with_context(|| format!("Failed to load schema '{}'", self.schema.display()))?;
        if let Some(max) = self.max_collection_size {
            document.options = document.options.with_max_collection_size(max);
        }
        Ok(DataGenerator::from_document(document, self.seed))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write generated values as JSON Lines
    Generate {
        #[command(flatten)]
        args: GenerateArgs,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Pretty-print each value
        #[arg(long)]
        pretty: bool,
    },

    /// Bind a schema and report contract errors
    Validate {
        /// Path to schema YAML file
        #[arg(long, short = 's')]
        schema: PathBuf,
    },

    /// Generate values and check each survives a JSON round trip
    Roundtrip {
        #[command(flatten)]
        args: GenerateArgs,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout carries generated data
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            args,
            output,
            pretty,
        } => {
            let generator = args.load()?;
            let mut populator = JsonlPopulator::new(generator).with_pretty(pretty);
            let metrics = match output {
                Some(path) => populator
                    .populate_file(&path, args.count)
                    .with_context(|| format!("Failed to write '{}'", path.display()))?,
                None => populator
                    .populate(std::io::stdout().lock(), args.count)
                    .context("Failed to write to stdout")?,
            };
            info!(
                rows = metrics.rows_written,
                bytes = metrics.bytes_written,
                generation = ?metrics.generation_duration,
                write = ?metrics.write_duration,
                "Generation finished"
            );
        }
        Commands::Validate { schema } => {
            let document = SchemaDocument::from_file(&schema)
                .with_context(|| format!("Failed to load schema '{}'", schema.display()))?;
            let mut generator = DataGenerator::from_document(document, Some(0));
            generator
                .bind()
                .with_context(|| format!("Schema '{}' is invalid", schema.display()))?;
            println!(
                "Schema '{}' is valid; target type {}",
                schema.display(),
                generator.target()
            );
        }
        Commands::Roundtrip { args } => {
            let mut generator = args.load()?;
            let report = run_roundtrip(&mut generator, args.count)
                .with_context(|| format!("Round trip failed for '{}'", args.schema.display()))?;
            println!(
                "{} values round-tripped ({} bytes of JSON)",
                report.values, report.bytes
            );
        }
    }

    Ok(())
}
