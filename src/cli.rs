//! Command-line interface definitions for MirrorMatch.
//!
//! Uses the clap derive API: global options (verbosity, JSON errors) and
//! subcommands for scanning and configuration.
//!
//! # Example
//!
//! ```bash
//! # Scan a folder, writing a CSV report to the current directory
//! mirrormatch scan ~/Documents
//!
//! # Only office documents and images, report to ~/reports, then open it
//! mirrormatch scan ~/Documents --office --report-dir ~/reports --open
//!
//! # Only .txt files, JSON to stdout
//! mirrormatch scan ~/notes --ext txt --output json
//!
//! # Verbose mode for debugging
//! mirrormatch -v scan ~/Documents
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Duplicate file finder.
///
/// MirrorMatch groups files by size, then by CRC-32 checksum, and confirms
/// every duplicate with a byte-for-byte comparison before reporting it.
#[derive(Debug, Parser)]
#[command(name = "mirrormatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a folder for duplicate files
    Scan(ScanArgs),
    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Folder to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Only scan files with this extension (repeatable, e.g. `--ext png --ext .JPG`)
    #[arg(short, long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Only scan office documents and common image formats
    #[arg(long, conflicts_with = "all")]
    pub office: bool,

    /// Scan every file, ignoring configured extensions
    #[arg(long, conflicts_with = "extensions")]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub output: OutputFormat,

    /// Write the CSV report to this file instead of a generated name
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Directory for generated report names
    #[arg(long, value_name = "DIR", conflicts_with = "report")]
    pub report_dir: Option<PathBuf>,

    /// Read size for checksums and comparisons (e.g. 65536, 64KiB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<usize>,

    /// Descend into symlinked directories
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Open the CSV report when duplicates were found
    #[arg(long)]
    pub open: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub init: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// CSV report file
    Csv,
    /// Plain text on stdout
    Text,
    /// JSON on stdout
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use mirrormatch::cli::parse_size;
///
/// assert_eq!(parse_size("65536").unwrap(), 65536);
/// assert_eq!(parse_size("64KiB").unwrap(), 65536);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// or has an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a chunk size: a positive [`parse_size`] value that fits in memory.
///
/// # Errors
///
/// Returns an error for zero, unparsable, or oversized values.
pub fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Chunk size must be at least 1 byte".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("Chunk size too large: {bytes}"))
}
