//! symdex CLI - Symfony project indexer
//!
//! Indexes the PHP sources of a Symfony project and prints what it found:
//! - namespace paths registered with the class loader
//! - service aliases set on the container
//! - kernel environments booted by front controllers
//! - variables controllers hand to templates
//! - view and route methods, and `@Route` declarations

mod cache;
mod config;
mod logging;
mod output;
mod process;
mod project;
mod session;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

use cache::{clear_cache, Cache};
use config::Config;
use output::{OutputFormat, Reporter};
use session::Session;
use watch::{run_watch, WatchConfig};

#[derive(Parser)]
#[command(name = "symdex")]
#[command(version)]
#[command(about = "Indexes namespaces, services, environments, template variables and routes of Symfony projects")]
struct Cli {
    /// Files or directories to index (default: the project root)
    paths: Vec<PathBuf>,

    /// Project root containing composer.json
    #[arg(long, short = 'p', value_name = "DIR", default_value = ".")]
    project: PathBuf,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Output format: text, json
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .symdex.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Index every file even if it is unchanged since the last run
    #[arg(long)]
    no_cache: bool,

    /// Delete the index cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Keep running and re-index when files change
    #[arg(long, short = 'w')]
    watch: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn load_config(cli: &Cli, project_root: &Path) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }
    if let Some(config_path) = &cli.config {
        debug!("Using config {}", config_path.display());
        return Config::load_path(config_path);
    }
    match Config::load_from(project_root)? {
        Some((config, path)) => {
            debug!("Using config {}", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn output_format(cli: &Cli, config: &Config) -> Result<OutputFormat> {
    if cli.json {
        return Ok(OutputFormat::Json);
    }
    let format = cli
        .format
        .as_deref()
        .or(config.output.format.as_deref())
        .unwrap_or("text");
    OutputFormat::from_str(format)
        .ok_or_else(|| anyhow::anyhow!("Invalid output format '{}'. Valid options: text, json", format))
}

/// Resolve the paths to index against the working directory; missing paths are kept as given
fn resolve_paths(paths: &[PathBuf], project_root: &Path) -> Vec<PathBuf> {
    if paths.is_empty() {
        return vec![project_root.to_path_buf()];
    }
    paths
        .iter()
        .map(|path| std::fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
        .collect()
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let project_root = std::fs::canonicalize(&cli.project)
        .with_context(|| format!("Project directory not found: {}", cli.project.display()))?;

    let config = load_config(&cli, &project_root)?;
    let format = output_format(&cli, &config)?;
    let paths = resolve_paths(&cli.paths, &project_root);

    if cli.clear_cache {
        clear_cache(&project_root)?;
    }

    if cli.watch {
        let mut watch_config = WatchConfig::new(project_root, paths, config);
        watch_config.format = format;
        watch_config.verbose = cli.verbose;
        run_watch(watch_config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let session = Session::new(project_root.clone(), config)?;
    let (files, missing_paths) = session.collect_files(&paths);

    for path in &missing_paths {
        warn!("Path does not exist: {}", path.display());
        if format == OutputFormat::Text {
            eprintln!("{}: Path does not exist: {}", "Warning".yellow(), path.display());
        }
    }

    let mut cache = if cli.no_cache {
        None
    } else {
        match Cache::load(&project_root) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Ignoring unreadable cache: {:#}", e);
                Some(Cache::default())
            }
        }
    };

    let mut reporter = Reporter::new(format, cli.verbose);
    session.index_files(&files, cache.as_mut(), &mut reporter);

    let summary = reporter.summary();
    debug!(
        "Indexed {} file(s), {} from cache, {} error(s)",
        summary.files_processed, summary.cached, summary.errors
    );

    if let Some(cache) = cache.as_mut() {
        cache.prune();
        if let Err(e) = cache.save(&project_root) {
            warn!("Failed to save cache: {:#}", e);
        }
    }

    reporter.finish(&project_root)?;
    Ok(ExitCode::SUCCESS)
}
