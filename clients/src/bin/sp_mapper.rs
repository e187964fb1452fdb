//! `sp-mapper`: Inspects entity mappings and checks or converts RDF documents.
//!
//! **Commands:**
//! - `describe [CLASS]`: lists the registered classes, or one class's field mappings
//! - `check FILE`: runs the conformance checks on a JSON-LD file
//! - `convert FILE --to <format>`: decodes a JSON-LD file and re-encodes it
//!   as JSON-LD, Turtle or N-Triples
//!
//! **Usage:**
//! ```
//! sp-mapper [--config <file>] [-v...] <command>
//! ```
//!
//! `check` exits non-zero if any check fails. Logging goes to stderr and is
//! controlled by `RUST_LOG` or the `-v` flag.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sp_conformance::{validate_file, ConformanceReport, Severity};
use sp_mapper::serializer::{jsonld, ntriples, turtle};
use sp_mapper::{Decoder, Encoder, MapperConfig, MappingKind, Multiplicity, Registry};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inspect StreamPipes entity mappings and check or convert RDF documents.
#[derive(Parser)]
#[command(name = "sp-mapper", about = "StreamPipes entity-to-RDF mapper", version)]
struct Args {
    /// Mapper configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered classes, or the field mappings of one class.
    Describe {
        /// Class identity, e.g. `MappingPropertyNary`.
        class: Option<String>,
    },
    /// Check a JSON-LD file against the registry.
    Check {
        /// JSON-LD file to check.
        file: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Decode a JSON-LD file and re-encode it in another format.
    Convert {
        /// JSON-LD file to convert.
        file: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Jsonld)]
        to: Format,

        /// Output file (default: stdout).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Jsonld,
    Turtle,
    Ntriples,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => MapperConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MapperConfig::default(),
    };
    let registry = Registry::with_model(config.context())
        .context("Failed to build the model registry")?;
    info!(classes = registry.len(), strict = config.strict, "registry ready");

    match args.command {
        Command::Describe { class } => describe(&registry, class.as_deref()),
        Command::Check { file, json } => check(&file, &registry, &config, json),
        Command::Convert { file, to, out } => {
            convert(&file, to, out.as_deref(), &registry, &config)
        }
    }
}

fn describe(registry: &Registry, class: Option<&str>) -> Result<()> {
    let Some(class) = class else {
        println!("{} registered classes", registry.len());
        for descriptor in registry.classes() {
            println!("  {:28} {}", descriptor.class, descriptor.type_tag);
        }
        return Ok(());
    };

    let descriptor = registry.describe(class)?;
    println!("{} ({})", descriptor.class, descriptor.type_tag);
    for field in &descriptor.fields {
        let mapping = match &field.kind {
            MappingKind::Identity => "subject".to_owned(),
            MappingKind::Predicate { iri, range } => format!("{iri} -> {range:?}"),
        };
        let multiplicity = match field.multiplicity {
            Multiplicity::Single => "",
            Multiplicity::Multi => " (multi)",
        };
        println!("  {:24} {mapping}{multiplicity}", field.name);
    }
    Ok(())
}

fn check(file: &Path, registry: &Registry, config: &MapperConfig, json: bool) -> Result<()> {
    let report = validate_file(file, registry, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(file, &report);
    }

    let failed = report.failure_count();
    if failed > 0 {
        eprintln!("Check FAILED: {failed} check(s) did not pass.");
        process::exit(1);
    }
    Ok(())
}

fn print_report(file: &Path, report: &ConformanceReport) {
    println!("Mapping conformance: {}", file.display());
    println!();
    for result in &report.results {
        println!("[{}] {}: {}", result.severity.label(), result.validator, result.message);
        for detail in &result.details {
            println!("       {detail}");
        }
    }
    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        report.count(Severity::Pass),
        report.count(Severity::Warning),
        report.count(Severity::Failure)
    );
}

fn convert(
    file: &Path,
    to: Format,
    out: Option<&Path>,
    registry: &Registry,
    config: &MapperConfig,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", file.display()))?;
    let doc = jsonld::from_json_ld(&value, registry.context())
        .with_context(|| format!("Failed to read JSON-LD from {}", file.display()))?;

    let entities = Decoder::new(registry, config)
        .decode(&doc)
        .with_context(|| format!("Failed to decode {}", file.display()))?;
    let doc = Encoder::new(registry, config).encode_all(&entities)?;
    info!(entities = entities.len(), triples = doc.triple_count(), "converted document");

    let context = registry.context();
    let text = match to {
        Format::Jsonld => serde_json::to_string_pretty(&jsonld::to_json_ld(&doc, context))?,
        Format::Turtle => turtle::to_turtle(&doc, context),
        Format::Ntriples => ntriples::to_ntriples(&doc, context),
    };

    match out {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} ({} bytes)", path.display(), text.len());
        }
        None => print!("{text}"),
    }
    Ok(())
}
