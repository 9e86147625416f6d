//! Watch mode for symdex - re-index on file changes
//!
//! Uses the `notify` crate for cross-platform file watching with debouncing.

use anyhow::Result;
use colored::*;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{debug, error};

use crate::cache::Cache;
use crate::config::Config;
use crate::output::{OutputFormat, Reporter};
use crate::project::COMPOSER_FILE;
use crate::session::Session;

/// Configuration for watch mode
pub struct WatchConfig {
    pub project_root: PathBuf,
    /// Paths to index
    pub paths: Vec<PathBuf>,
    pub config: Config,
    pub format: OutputFormat,
    pub verbose: bool,
    /// Debounce duration (default 100ms)
    pub debounce: Duration,
}

impl WatchConfig {
    pub fn new(project_root: PathBuf, paths: Vec<PathBuf>, config: Config) -> Self {
        Self {
            project_root,
            paths,
            config,
            format: OutputFormat::Text,
            verbose: false,
            debounce: Duration::from_millis(100),
        }
    }

    /// Files whose change invalidates every index entry
    fn settings_files(&self) -> Vec<PathBuf> {
        std::iter::once(self.project_root.join(COMPOSER_FILE))
            .chain(
                self.config
                    .service_files()
                    .iter()
                    .map(|file| self.project_root.join(file)),
            )
            .collect()
    }
}

/// What a batch of file events asks for
#[derive(Debug, Default, PartialEq, Eq)]
struct ChangeSet {
    php_files: Vec<PathBuf>,
    settings_changed: bool,
}

impl ChangeSet {
    fn is_empty(&self) -> bool {
        self.php_files.is_empty() && !self.settings_changed
    }
}

fn classify_changes<'p>(paths: impl IntoIterator<Item = &'p Path>, settings_files: &[PathBuf]) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for path in paths {
        if settings_files.iter().any(|settings| settings == path) {
            changes.settings_changed = true;
        } else if path.extension().is_some_and(|ext| ext == "php") {
            let path = path.to_path_buf();
            if !changes.php_files.contains(&path) {
                changes.php_files.push(path);
            }
        }
    }

    changes
}

/// Run watch mode - monitors the project and re-indexes on changes
pub fn run_watch(config: WatchConfig) -> Result<()> {
    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(config.debounce, tx)?;
    debouncer
        .watcher()
        .watch(&config.project_root, RecursiveMode::Recursive)?;
    for path in &config.paths {
        if !path.starts_with(&config.project_root) && path.exists() {
            debouncer.watcher().watch(path, RecursiveMode::Recursive)?;
        }
    }

    if config.format == OutputFormat::Text {
        println!("{} Watching: {}", "→".cyan(), config.project_root.display());
        println!();
        println!("{}", "Watching for changes (Ctrl+C to stop)...".dimmed());
        println!();
    }

    let settings_files = config.settings_files();
    let mut session = Session::new(config.project_root.clone(), config.config.clone())?;
    let mut cache = Cache::default();

    run_index(&config, &session, &mut cache)?;

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changes = classify_changes(
                    events
                        .iter()
                        .filter(|event| event.kind == DebouncedEventKind::Any)
                        .map(|event| event.path.as_path()),
                    &settings_files,
                );
                if changes.is_empty() {
                    continue;
                }

                if config.format == OutputFormat::Text {
                    print!("\x1B[2J\x1B[1;1H");
                    println!("{}", "File changes detected, re-indexing...".cyan());
                    println!();
                }

                if changes.settings_changed {
                    debug!("Project settings changed, reloading services");
                    match Session::new(config.project_root.clone(), config.config.clone()) {
                        Ok(reloaded) => session = reloaded,
                        Err(e) => error!("Keeping previous services: {:#}", e),
                    }
                }
                for path in &changes.php_files {
                    cache.invalidate(path);
                }
                cache.prune();

                run_index(&config, &session, &mut cache)?;

                if config.format == OutputFormat::Text {
                    println!();
                    println!("{}", "Watching for changes (Ctrl+C to stop)...".dimmed());
                }
            }
            Ok(Err(e)) => {
                error!("Watch error: {:?}", e);
            }
            Err(_) => {
                // Channel closed
                break;
            }
        }
    }

    Ok(())
}

fn run_index(config: &WatchConfig, session: &Session, cache: &mut Cache) -> Result<()> {
    let (files, _) = session.collect_files(&config.paths);
    let mut reporter = Reporter::new(config.format, config.verbose);
    session.index_files(&files, Some(cache), &mut reporter);
    reporter.finish(&config.project_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::new(PathBuf::from("/acme"), vec![PathBuf::from("/acme/src")], Config::default());
        assert_eq!(config.format, OutputFormat::Text);
        assert!(!config.verbose);
        assert_eq!(config.debounce, Duration::from_millis(100));
        assert_eq!(
            config.settings_files(),
            vec![
                PathBuf::from("/acme/composer.json"),
                PathBuf::from("/acme/app/config/services.yml"),
                PathBuf::from("/acme/config/services.yaml"),
            ]
        );
    }

    #[test]
    fn test_classify_changes() {
        let settings = vec![PathBuf::from("/acme/composer.json")];
        let paths = [
            Path::new("/acme/src/Controller/PostController.php"),
            Path::new("/acme/src/Controller/PostController.php"),
            Path::new("/acme/app/config/routing.yml"),
        ];
        let changes = classify_changes(paths, &settings);
        assert_eq!(
            changes.php_files,
            vec![PathBuf::from("/acme/src/Controller/PostController.php")]
        );
        assert!(!changes.settings_changed);

        let changes = classify_changes([Path::new("/acme/composer.json")], &settings);
        assert!(changes.settings_changed);
        assert!(changes.php_files.is_empty());

        assert!(classify_changes([Path::new("/acme/README.md")], &settings).is_empty());
    }
}
