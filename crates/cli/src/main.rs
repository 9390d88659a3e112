//! CLI tool for turning conference submission tables into paper records.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use paper_core::{Aggregator, ConsistencyCheck, DocumentFormat, DocumentFormatter, GroupOrder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Format conference submission rows into one record per paper.
#[derive(Parser, Debug)]
#[command(name = "paper-import")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tab-separated table of paper sessions (one row per paper and session)
    input: PathBuf,

    /// Output file (default: papers.yml, or papers.json with --format json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Output document format
    #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Order of the paper records in the output
    #[arg(long, value_enum, default_value_t = Order::Sorted)]
    order: Order,

    /// Fail when rows of one paper disagree on title or abstract
    #[arg(long)]
    strict: bool,

    /// Write JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// The file the document is written to.
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("papers.{}", DocumentFormat::from(self.format).extension()))
        })
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Block-style YAML
    Yaml,
    /// JSON array
    Json,
}

impl From<Format> for DocumentFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => DocumentFormat::Yaml,
            Format::Json => DocumentFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    /// Ascending by UID
    Sorted,
    /// As the papers first appear in the input
    FirstSeen,
}

impl From<Order> for GroupOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Sorted => GroupOrder::SortedByUid,
            Order::FirstSeen => GroupOrder::FirstSeen,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error processing {}: {:#}", args.input.display(), e);
            ExitCode::FAILURE
        }
    }
}

/// Read, merge and write; nothing is written unless every step succeeds.
fn run(args: &Args) -> Result<()> {
    let document = build_document(args)?;

    if args.print {
        print!("{}", document);
    } else {
        let output_path = args.output_path();
        write_output(&output_path, &document)?;
        if args.verbose {
            eprintln!("Written to: {}", output_path.display());
        }
    }

    Ok(())
}

/// Build the full output document for the input table.
fn build_document(args: &Args) -> Result<String> {
    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let rows = paper_core::read_rows_from_path(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    log::debug!("Read {} rows from {}", rows.len(), args.input.display());

    let consistency = if args.strict {
        ConsistencyCheck::Strict
    } else {
        ConsistencyCheck::Warn
    };
    let aggregator = Aggregator::new()
        .with_order(args.order.into())
        .with_consistency(consistency);

    let records = aggregator.aggregate(&rows)?;
    log::debug!("Merged {} rows into {} papers", rows.len(), records.len());

    if args.verbose {
        eprintln!("  {} rows merged into {} papers", rows.len(), records.len());
    }

    let formatter = DocumentFormatter::new()
        .with_format(args.format.into())
        .with_pretty(!args.compact);
    log::debug!("Formatting as {:?}", args.format);
    let document = formatter
        .format(&records)
        .context("Failed to serialize paper records")?;

    Ok(document)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["paper-import", "papers.tsv"]);

        assert_eq!(args.input, PathBuf::from("papers.tsv"));
        assert_eq!(args.output, None);
        assert_eq!(args.output_path(), PathBuf::from("papers.yml"));
        assert_eq!(args.format, Format::Yaml);
        assert_eq!(args.order, Order::Sorted);
        assert!(!args.print);
        assert!(!args.strict);
        assert!(!args.compact);
    }

    #[test]
    fn test_args_json_default_output_name() {
        let args = Args::parse_from(["paper-import", "papers.tsv", "--format", "json"]);

        assert_eq!(DocumentFormat::from(args.format), DocumentFormat::Json);
        assert_eq!(args.output_path(), PathBuf::from("papers.json"));
    }

    #[test]
    fn test_args_options() {
        let args = Args::parse_from([
            "paper-import",
            "papers.tsv",
            "--order",
            "first-seen",
            "--strict",
            "-o",
            "out/program.yml",
        ]);

        assert_eq!(args.order, Order::FirstSeen);
        assert_eq!(GroupOrder::from(args.order), GroupOrder::FirstSeen);
        assert!(args.strict);
        assert_eq!(args.output_path(), PathBuf::from("out/program.yml"));
    }

    #[test]
    fn test_args_require_input() {
        assert!(Args::try_parse_from(["paper-import"]).is_err());
    }
}
