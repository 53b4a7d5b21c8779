use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_drift_core::{
    DiffReport, MergeConfig, ParsedSchema, diff, required_from_tree, union,
};
use schema_drift_dialects::{Dialect, parse_source};

/// CLI-facing dialect enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliDialect {
    Sql,
    Protobuf,
    Spark,
    Jsonschema,
    Dbt,
    Records,
}

impl From<CliDialect> for Dialect {
    fn from(dialect: CliDialect) -> Self {
        match dialect {
            CliDialect::Sql => Self::Sql,
            CliDialect::Protobuf => Self::Protobuf,
            CliDialect::Spark => Self::Spark,
            CliDialect::Jsonschema => Self::JsonSchema,
            CliDialect::Dbt => Self::Dbt,
            CliDialect::Records => Self::Records,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Text => f.write_str("text"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "schema-drift")]
#[command(about = "Normalize and diff schemas across SQL, Protobuf, Spark, JSON Schema, dbt, and sampled data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare two schema sources and report categorized differences.
    Diff(DiffArgs),
    /// Parse one schema source and print its normalized form.
    Show(ShowArgs),
    /// Merge sampled record files into one inferred schema.
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
struct DiffArgs {
    /// Left-hand schema source file.
    left: PathBuf,
    /// Right-hand schema source file.
    right: PathBuf,
    /// Dialect of the left source (default: detect from file).
    #[arg(long, value_enum)]
    left_dialect: Option<CliDialect>,
    /// Dialect of the right source (default: detect from file).
    #[arg(long, value_enum)]
    right_dialect: Option<CliDialect>,
    /// Table/message/model to select from the left source.
    #[arg(long)]
    select_left: Option<String>,
    /// Table/message/model to select from the right source.
    #[arg(long)]
    select_right: Option<String>,
    /// Treat date-like sampled strings as plain strings.
    #[arg(long)]
    no_infer_temporal: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Schema source file.
    input: PathBuf,
    /// Dialect of the source (default: detect from file).
    #[arg(long, value_enum)]
    dialect: Option<CliDialect>,
    /// Table/message/model to select.
    #[arg(long)]
    select: Option<String>,
    /// Treat date-like sampled strings as plain strings.
    #[arg(long)]
    no_infer_temporal: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Record sample files (NDJSON or JSON arrays).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Treat date-like sampled strings as plain strings.
    #[arg(long)]
    no_infer_temporal: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Diff(args) => run_diff(args),
        Command::Show(args) => run_show(args),
        Command::Merge(args) => run_merge(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_diff(args: DiffArgs) -> Result<(), String> {
    let config = merge_config(args.no_infer_temporal);
    let left = load_schema(
        &args.left,
        args.left_dialect,
        args.select_left.as_deref(),
        &config,
    )?;
    let right = load_schema(
        &args.right,
        args.right_dialect,
        args.select_right.as_deref(),
        &config,
    )?;

    let report = diff(&left, &right);
    match args.format {
        OutputFormat::Json => println!("{}", to_pretty_json(&report)?),
        OutputFormat::Text => print!("{}", render_report(&report, &left.label, &right.label)),
    }

    // Non-empty drift is distinguishable from success and from errors.
    if !report.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let config = merge_config(args.no_infer_temporal);
    let schema = load_schema(&args.input, args.dialect, args.select.as_deref(), &config)?;
    let normalized = schema.normalized();

    match args.format {
        OutputFormat::Json => println!("{}", to_pretty_json(&normalized)?),
        OutputFormat::Text => {
            println!("{}: {}", normalized.label, normalized.root.display_form());
            for path in &normalized.required {
                println!("required: {path}");
            }
        }
    }
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), String> {
    let config = merge_config(args.no_infer_temporal);

    let mut merged: Option<ParsedSchema> = None;
    for input in &args.inputs {
        let schema = load_schema(input, Some(CliDialect::Records), None, &config)?;
        merged = Some(match merged.take() {
            Some(acc) => {
                let root = union(&acc.root, &schema.root);
                let required = required_from_tree(&root);
                ParsedSchema::new(root, required, acc.label)
            }
            None => schema,
        });
    }

    let merged = merged.expect("clap enforces at least one input").normalized();
    match args.format {
        OutputFormat::Json => println!("{}", to_pretty_json(&merged)?),
        OutputFormat::Text => {
            println!("{}: {}", merged.label, merged.root.display_form());
            for path in &merged.required {
                println!("required: {path}");
            }
        }
    }
    Ok(())
}

fn merge_config(no_infer_temporal: bool) -> MergeConfig {
    MergeConfig {
        infer_temporal: !no_infer_temporal,
    }
}

fn load_schema(
    path: &Path,
    dialect: Option<CliDialect>,
    selector: Option<&str>,
    config: &MergeConfig,
) -> Result<ParsedSchema, String> {
    let source =
        fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let dialect = match dialect {
        Some(choice) => choice.into(),
        None => Dialect::detect(path, &source).map_err(|err| err.to_string())?,
    };
    parse_source(dialect, &source, selector, config)
        .map_err(|err| format!("{}: {err}", path.display()))
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| err.to_string())
}

fn render_report(report: &DiffReport, left_label: &str, right_label: &str) -> String {
    if report.is_empty() {
        return format!("{left_label} and {right_label} match\n");
    }

    let mut out = String::new();
    if !report.only_in_left.is_empty() {
        out.push_str(&format!("only in {left_label}:\n"));
        for path in &report.only_in_left {
            out.push_str(&format!("  {path}\n"));
        }
    }
    if !report.only_in_right.is_empty() {
        out.push_str(&format!("only in {right_label}:\n"));
        for path in &report.only_in_right {
            out.push_str(&format!("  {path}\n"));
        }
    }
    if !report.type_mismatches.is_empty() {
        out.push_str("type mismatches:\n");
        for change in &report.type_mismatches {
            out.push_str(&format!(
                "  {}: {} -> {}\n",
                change.path, change.left, change.right
            ));
        }
    }
    if !report.presence_issues.is_empty() {
        out.push_str("presence changes:\n");
        for change in &report.presence_issues {
            out.push_str(&format!(
                "  {}: {} -> {}\n",
                change.path, change.left, change.right
            ));
        }
    }
    if !report.path_relocations.is_empty() {
        out.push_str("relocated fields:\n");
        for relocation in &report.path_relocations {
            out.push_str(&format!(
                "  {}: [{}] -> [{}]\n",
                relocation.name,
                relocation.left_paths.join(", "),
                relocation.right_paths.join(", ")
            ));
        }
    }
    out
}
