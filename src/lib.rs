//! MirrorMatch - Duplicate File Finder
//!
//! Walks a folder, groups files by size, narrows each size group by CRC-32
//! checksum, and confirms duplicates with an exact byte comparison. Scans run
//! on a worker thread that can be paused, resumed and cancelled, and the
//! confirmed groups are written as a CSV report.

pub mod cli;
pub mod config;
pub mod control;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, ConfigArgs, OutputFormat, ScanArgs};
use crate::config::{Config, OFFICE_EXTENSIONS};
use crate::control::ScanControl;
use crate::duplicates::{FinderConfig, ScanController, ScanOutcome};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::path_utils::resolve_absolute;
use crate::scanner::WalkerConfig;

/// Run the command described by `cli` and return the process exit code.
///
/// # Errors
///
/// Returns an error if the folder is invalid, the scan worker fails, or
/// output cannot be written. Cancellation is not an error.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let config = Config::load();

    match cli.command {
        Commands::Scan(args) => run_scan(&args, &config, cli.quiet),
        Commands::Config(args) => run_config(&args, &config),
    }
}

/// Extensions for a scan: `--all` > `--ext`/`--office` > configured list.
#[must_use]
pub fn effective_extensions(args: &ScanArgs, config: &Config) -> Vec<String> {
    if args.all {
        return Vec::new();
    }
    let mut selected = args.extensions.clone();
    if args.office {
        selected.extend(OFFICE_EXTENSIONS.iter().map(|e| (*e).to_string()));
    }
    if selected.is_empty() {
        selected = config.extensions.clone();
    }
    scanner::normalize_extensions(selected)
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    duplicates::validate_root(&args.path).context("Scan failed")?;
    let root = resolve_absolute(&args.path)
        .with_context(|| format!("Cannot resolve {}", args.path.display()))?;

    let walker_config = WalkerConfig::default()
        .with_extensions(effective_extensions(args, config))
        .with_follow_symlinks(args.follow_symlinks || config.follow_symlinks);
    let mut finder_config = FinderConfig::default()
        .with_walker_config(walker_config)
        .with_chunk_size(args.chunk_size.unwrap_or(config.chunk_size));

    let show_progress = !quiet && !args.no_progress;
    let progress = Arc::new(Progress::new(!show_progress));
    finder_config = finder_config.with_progress(progress.clone());

    let controller = ScanController::new();
    signal::install_handler(controller.control())
        .context("Failed to install signal handler")?;

    let handle = controller
        .start(&root, finder_config)
        .context("Scan failed")?;

    if show_progress && io::stdin().is_terminal() {
        eprintln!("Press Enter to pause or resume, Ctrl+C to cancel.");
        let control = controller.control();
        let progress = Arc::clone(&progress);
        // Detached: it stays blocked on stdin until the process exits.
        let spawned = std::thread::Builder::new()
            .name("mirrormatch-pause-key".to_string())
            .spawn(move || listen_for_pause(io::stdin().lock(), &control, &progress));
        if let Err(e) = spawned {
            log::warn!("Pause key unavailable: {e}");
        }
    }

    let outcome = handle.wait().context("Scan failed")?;

    let (groups, summary) = match outcome {
        ScanOutcome::Cancelled => {
            progress.clear();
            eprintln!("User cancelled the scanning operation.");
            return Ok(ExitCode::Interrupted);
        }
        ScanOutcome::Completed { groups, summary } => {
            progress.finish();
            (groups, summary)
        }
    };

    let exit_code = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    match args.output {
        OutputFormat::Json => {
            JsonOutput::new(&root, &groups, &summary, exit_code)
                .write_to(io::stdout().lock())
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Text => {
            TextOutput::new(&groups, &summary)
                .write_to(io::stdout().lock())
                .context("Failed to write text output")?;
        }
        OutputFormat::Csv => {
            if groups.is_empty() {
                println!("Scanning completed. No duplicates found.");
            } else {
                let path = report_path(args, config, &root);
                let written = output::write_report(&groups, &path)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                let shown = resolve_absolute(&written).unwrap_or(written);
                println!("Scanning completed. CSV saved at:\n{}", shown.display());

                if args.open || config.open_report {
                    if let Err(e) = output::open_report(&shown) {
                        log::warn!("Could not open {}: {e}", shown.display());
                    }
                }
            }
        }
    }

    io::stdout().flush().ok();
    Ok(exit_code)
}

/// Toggle pause on `control` for every line read from `input`.
///
/// Stops at end of input, on a read error, or once the scan is cancelled.
fn listen_for_pause<R: BufRead>(input: R, control: &ScanControl, progress: &Progress) {
    for line in input.lines() {
        if line.is_err() || control.is_cancelled() {
            break;
        }
        let paused = control.toggle_pause();
        log::debug!("Scan {}", if paused { "paused" } else { "resumed" });
        progress.set_paused(paused);
    }
}

/// Report location: `--report` > `--report-dir` > configured dir > cwd.
fn report_path(args: &ScanArgs, config: &Config, root: &Path) -> PathBuf {
    if let Some(path) = &args.report {
        return path.clone();
    }
    let name = output::report_file_name(root, chrono::Local::now());
    match args.report_dir.as_ref().or(config.report_dir.as_ref()) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn run_config(args: &ConfigArgs, config: &Config) -> Result<ExitCode> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;

    if args.init {
        let path = config.save().context("Failed to save configuration")?;
        println!("Configuration written to {}", path.display());
    } else {
        match Config::config_path() {
            Ok(path) => println!("# {}", path.display()),
            Err(e) => log::debug!("{e}"),
        }
        print!("{rendered}");
    }
    Ok(ExitCode::Success)
}
