//! Command-line interface for sgql.
//!
//! # Usage
//!
//! ```bash
//! # Validate a document against a schema, both JSON-encoded
//! sgql validate --schema schema.json --document query.json
//!
//! # Print diagnostics in the wire format
//! sgql validate --schema schema.json --document query.json --format json
//! ```
//!
//! The exit code is 0 for a valid document and 1 when any diagnostic was
//! reported.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use sgql_core::Diagnostic;
use sgql_semantic::{validate, Schema};
use sgql_syntax::{Document, FragmentTable};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "sgql")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, one diagnostic per line
    #[default]
    Pretty,
    /// The `errors` array as sent to clients
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a document against a schema
    Validate {
        /// JSON-encoded schema
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON-encoded document
        #[arg(short, long)]
        document: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

/// CLI error.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode diagnostics: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Runs a command and returns the process exit code.
pub fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Commands::Validate {
            schema,
            document,
            format,
        } => validate_files(&schema, &document, format, cli.verbose, cli.quiet),
        Commands::Version => {
            println!("sgql {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn validate_files(
    schema_path: &Path,
    document_path: &Path,
    format: OutputFormat,
    verbose: bool,
    quiet: bool,
) -> Result<i32, CliError> {
    if verbose {
        println!("{} {}", "Checking".blue(), document_path.display());
    }

    let schema = load_schema(&read(schema_path)?, schema_path)?;
    let mut document = load_document(&read(document_path)?, document_path)?;
    let diagnostics = check(&schema, &mut document);
    info!(
        document = %document_path.display(),
        diagnostics = diagnostics.len(),
        "validated document"
    );

    if diagnostics.is_empty() {
        if format == OutputFormat::Json {
            println!("[]");
        } else if !quiet {
            println!("{} {}", "OK".green(), document_path.display());
        }
        return Ok(0);
    }

    match format {
        OutputFormat::Json => println!("{}", render_json(&diagnostics)?),
        OutputFormat::Pretty => eprint!("{}", render_pretty(document_path, &diagnostics)),
    }
    Ok(1)
}

fn read(path: &Path) -> Result<String, CliError> {
    debug!(path = %path.display(), "reading input");
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes a schema and registers the built-in scalars and meta types.
pub fn load_schema(source: &str, path: &Path) -> Result<Schema, CliError> {
    let mut schema: Schema = serde_json::from_str(source).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    schema.ensure_builtins();
    Ok(schema)
}

pub fn load_document(source: &str, path: &Path) -> Result<Document, CliError> {
    serde_json::from_str(source).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reports fragment table problems followed by validation diagnostics.
pub fn check(schema: &Schema, document: &mut Document) -> Vec<Diagnostic> {
    let (_, fragment_errors) = FragmentTable::build(document);
    let mut diagnostics = fragment_errors.into_vec();
    diagnostics.extend(validate(schema, document));
    diagnostics
}

pub fn render_json(diagnostics: &[Diagnostic]) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(diagnostics)?)
}

pub fn render_pretty(path: &Path, diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("{} {}\n", "Error".red().bold(), path.display());
    for diagnostic in diagnostics {
        out.push_str(&format!("  {} {}\n", "-->".blue(), diagnostic));
    }
    out.push_str(&format!(
        "{} {} diagnostic(s)\n",
        "Failed:".red().bold(),
        diagnostics.len()
    ));
    out
}
