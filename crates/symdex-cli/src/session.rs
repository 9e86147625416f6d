//! One indexing pass over a project
//!
//! A `Session` bundles what every file of a run shares: the project root,
//! the configuration, the service registry and the settings hash used to
//! validate cache entries.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use symdex_indexer::Indexer;

use crate::cache::{hash_contents, hash_settings, Cache};
use crate::config::Config;
use crate::output::Reporter;
use crate::process::{index_source, FileIndex};
use crate::project::{ComposerNature, ServiceRegistry};

/// What happened to a single file
enum Outcome {
    Indexed { content_hash: u64, file: FileIndex },
    Cached(FileIndex),
    ParseError,
    Failed(String),
}

pub struct Session {
    pub project_root: PathBuf,
    pub config: Config,
    services: ServiceRegistry,
    nature: ComposerNature,
    settings_hash: u64,
}

impl Session {
    pub fn new(project_root: PathBuf, config: Config) -> Result<Self> {
        let service_files = config.service_files();
        let services = ServiceRegistry::load(&project_root.to_string_lossy(), &service_files)
            .context("Failed to load service definitions")?;
        debug!("Loaded {} service definition(s)", services.len());

        let settings_hash = hash_settings(&config.index, &project_root, &service_files);

        Ok(Self {
            project_root,
            config,
            services,
            nature: ComposerNature,
            settings_hash,
        })
    }

    /// Collect the PHP files below `paths`, sorted; returns the files and the paths that do not exist
    pub fn collect_files(&self, paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut file_paths: Vec<PathBuf> = Vec::new();
        let mut missing_paths: Vec<PathBuf> = Vec::new();

        for path in paths {
            if path.is_file() {
                file_paths.push(path.clone());
            } else if path.is_dir() {
                for entry in walkdir::WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
                {
                    let file_path = entry.path();
                    if !self.is_excluded(file_path) {
                        file_paths.push(file_path.to_path_buf());
                    }
                }
            } else {
                missing_paths.push(path.clone());
            }
        }

        file_paths.sort();
        file_paths.dedup();
        (file_paths, missing_paths)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);
        self.config.should_exclude(relative)
    }

    /// Index `files` in parallel and report them in order
    ///
    /// With a cache, unchanged files are read back from it and freshly
    /// indexed files are stored into it.
    pub fn index_files(&self, files: &[PathBuf], mut cache: Option<&mut Cache>, reporter: &mut Reporter) {
        let indexer = Indexer::new(&self.config.index, &self.nature, &self.services);
        let cached = cache.as_deref();

        let outcomes: Vec<Outcome> = files
            .par_iter()
            .map(|path| self.index_one(path, &indexer, cached))
            .collect();

        for (path, outcome) in files.iter().zip(outcomes) {
            let display = path.strip_prefix(&self.project_root).unwrap_or(path);
            match outcome {
                Outcome::Indexed { content_hash, file } => {
                    reporter.report_file(display, &file, false);
                    if let Some(cache) = cache.as_deref_mut() {
                        cache.update(path.clone(), content_hash, self.settings_hash, file);
                    }
                }
                Outcome::Cached(file) => reporter.report_file(display, &file, true),
                Outcome::ParseError => {
                    warn!("Skipping {}: parse error", path.display());
                    reporter.report_error(display, "Parse error");
                }
                Outcome::Failed(message) => reporter.report_error(display, &message),
            }
        }
    }

    fn index_one(&self, path: &Path, indexer: &Indexer<'_>, cache: Option<&Cache>) -> Outcome {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => return Outcome::Failed(format!("Failed to read file: {}", e)),
        };
        let content_hash = hash_contents(source.as_bytes());

        if let Some(file) = cache.and_then(|c| c.get_if_valid(path, content_hash, self.settings_hash)) {
            return Outcome::Cached(file.clone());
        }

        match index_source(&source, path, &self.project_root, indexer) {
            Some(file) => Outcome::Indexed { content_hash, file },
            None => Outcome::ParseError,
        }
    }
}
