//! valrec - Values reconciliation CLI tool
//!
//! A command line tool for carrying Helm chart values customizations from one
//! chart version to the next.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use values_reconciler::patch::ModificationSet;
use values_reconciler::reconcile::{self, Reconciled};

#[derive(Debug, Parser)]
#[command(name = "valrec", version, about = "Reconcile chart values across chart versions")]
struct Cli {
    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the modifications between the old defaults and the user's values
    Diff {
        /// Old chart defaults. Omit for an empty document
        #[arg(long)]
        old: Option<PathBuf>,
        /// The user's values. Omit for an empty document
        #[arg(long)]
        user: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Apply a JSON or YAML patch file to chart defaults
    Apply {
        #[arg(long)]
        defaults: PathBuf,
        #[arg(long)]
        patch: PathBuf,
    },
    /// Carry the user's edits of the old defaults over to the new defaults
    Reconcile {
        #[arg(long)]
        old: Option<PathBuf>,
        #[arg(long)]
        user: Option<PathBuf>,
        #[arg(long)]
        new: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(&cli.output)
            .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?)
    };

    match cli.command {
        Command::Diff { old, user, format } => {
            diff(old.as_deref(), user.as_deref(), format, &mut output)?;
        }
        Command::Apply { defaults, patch } => {
            apply(&defaults, &patch, &mut output)?;
        }
        Command::Reconcile { old, user, new } => {
            reconcile_values(old.as_deref(), user.as_deref(), &new, &mut output)?;
        }
    }

    output.flush()?;
    Ok(())
}

/// Reads a values document. A missing path is an absent (empty) document.
fn read_document(file: Option<&Path>) -> Result<String, Box<dyn std::error::Error>> {
    match file {
        Some(file) => Ok(fs::read_to_string(file)
            .map_err(|e| format!("Failed to read file {:?}: {}", file, e))?),
        None => Ok(String::new()),
    }
}

fn diff(
    old: Option<&Path>,
    user: Option<&Path>,
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = read_document(old)?;
    let user = read_document(user)?;

    let modifications = reconcile::compute_modifications(&old, &user)?;

    match format {
        Format::Json => writeln!(output, "{}", serde_json::to_string_pretty(&modifications)?)?,
        Format::Yaml => write!(output, "{}", serde_yaml::to_string(&modifications)?)?,
    }

    Ok(())
}

fn apply(
    defaults: &Path,
    patch: &Path,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = read_document(Some(defaults))?;
    let patch_content = read_document(Some(patch))?;

    // JSON is valid YAML, so one reader handles both patch formats.
    let modifications: ModificationSet = serde_yaml::from_str(&patch_content)
        .map_err(|e| format!("Failed to parse patch {:?}: {}", patch, e))?;

    let reconciled = reconcile::apply_modifications(&defaults, &modifications)?;
    write_reconciled(reconciled, output)
}

fn reconcile_values(
    old: Option<&Path>,
    user: Option<&Path>,
    new: &Path,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = read_document(old)?;
    let user = read_document(user)?;
    let new = read_document(Some(new))?;

    let reconciled = reconcile::reconcile(&old, &user, &new)?;
    write_reconciled(reconciled, output)
}

fn write_reconciled(
    reconciled: Reconciled,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    for skipped in &reconciled.skipped {
        eprintln!("{}", skipped);
    }
    write!(output, "{}", reconciled.values)?;
    Ok(())
}
