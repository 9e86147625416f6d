//! Project detection and service definitions
//!
//! `ComposerNature` decides from `composer.json` whether a project is a
//! Symfony project. `ServiceRegistry` answers service lookups from the
//! project's YAML service files.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use symdex_core::{NatureError, ProjectNature, ServiceDefinition, ServiceLookup};
use thiserror::Error;
use tracing::debug;

pub const COMPOSER_FILE: &str = "composer.json";

/// Packages whose presence marks a Symfony project
const FRAMEWORK_PACKAGES: &[&str] = &["symfony/symfony", "symfony/framework-bundle"];

#[derive(Debug, Default, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    require: HashMap<String, serde_json::Value>,
    #[serde(default, rename = "require-dev")]
    require_dev: HashMap<String, serde_json::Value>,
}

impl ComposerManifest {
    fn requires_framework(&self) -> bool {
        self.require
            .keys()
            .chain(self.require_dev.keys())
            .any(|package| {
                FRAMEWORK_PACKAGES
                    .iter()
                    .any(|marker| package.eq_ignore_ascii_case(marker))
            })
    }
}

/// Reads the framework marker from `composer.json` at the project root
#[derive(Debug, Default)]
pub struct ComposerNature;

impl ProjectNature for ComposerNature {
    fn has_framework_marker(&self, project_path: &str) -> Result<bool, NatureError> {
        let root = Path::new(project_path);
        if !root.is_dir() {
            return Err(NatureError::Inaccessible(project_path.to_string()));
        }

        let manifest_path = root.join(COMPOSER_FILE);
        if !manifest_path.exists() {
            return Ok(false);
        }

        let descriptor_error = |message: String| NatureError::Descriptor {
            path: manifest_path.display().to_string(),
            message,
        };
        let contents =
            std::fs::read_to_string(&manifest_path).map_err(|e| descriptor_error(e.to_string()))?;
        let manifest: ComposerManifest =
            serde_json::from_str(&contents).map_err(|e| descriptor_error(e.to_string()))?;

        Ok(manifest.requires_framework())
    }
}

/// Errors raised while loading service definitions
#[derive(Error, Debug)]
pub enum ServiceRegistryError {
    #[error("Failed to read service file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse service file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ServiceFile {
    #[serde(default)]
    services: HashMap<String, Option<ServiceEntryYaml>>,
}

/// A `services:` entry: either a `'@target'` shorthand or a full definition
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceEntryYaml {
    Shorthand(String),
    Definition(ServiceYaml),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServiceYaml {
    class: Option<String>,
    public: Option<bool>,
    tags: Vec<TagYaml>,
    alias: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagYaml {
    Name(String),
    Table { name: String },
}

impl TagYaml {
    fn name(&self) -> &str {
        match self {
            TagYaml::Name(name) | TagYaml::Table { name } => name,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredService {
    class_name: Option<String>,
    public: bool,
    tags: Vec<String>,
    alias: Option<String>,
}

impl StoredService {
    fn from_yaml(entry: Option<ServiceEntryYaml>) -> Self {
        match entry {
            Some(ServiceEntryYaml::Shorthand(target)) => Self {
                class_name: None,
                public: true,
                tags: Vec::new(),
                alias: Some(target.trim_start_matches('@').to_string()),
            },
            Some(ServiceEntryYaml::Definition(def)) => Self {
                class_name: def.class,
                public: def.public.unwrap_or(true),
                tags: def.tags.iter().map(|t| t.name().to_string()).collect(),
                alias: def.alias.map(|a| a.trim_start_matches('@').to_string()),
            },
            None => Self {
                class_name: None,
                public: true,
                tags: Vec::new(),
                alias: None,
            },
        }
    }
}

/// Service definitions of the container, per project
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    /// project path -> lowercased service id -> definition
    projects: HashMap<String, HashMap<String, StoredService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the given service files of a project; missing files are skipped
    pub fn load(project_path: &str, files: &[PathBuf]) -> Result<Self, ServiceRegistryError> {
        let mut registry = Self::new();
        let root = Path::new(project_path);

        for file in files {
            let path = root.join(file);
            if !path.exists() {
                debug!("No service file at {}", path.display());
                continue;
            }
            registry.add_file(project_path, &path)?;
        }

        Ok(registry)
    }

    pub fn add_file(&mut self, project_path: &str, path: &Path) -> Result<(), ServiceRegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ServiceRegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_yaml(project_path, &contents)
            .map_err(|source| ServiceRegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Add the `services:` of one YAML document; later definitions win
    pub fn add_yaml(&mut self, project_path: &str, contents: &str) -> Result<(), serde_yaml::Error> {
        // An empty document deserializes to unit, not to a map
        if contents.trim().is_empty() {
            return Ok(());
        }
        let file: ServiceFile = serde_yaml::from_str(contents)?;
        let services = self.projects.entry(project_path.to_string()).or_default();
        for (id, entry) in file.services {
            services.insert(id.to_lowercase(), StoredService::from_yaml(entry));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.projects.values().map(HashMap::len).sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ServiceLookup for ServiceRegistry {
    fn find_service(&self, id: &str, project_path: &str) -> Option<ServiceDefinition> {
        let services = self.projects.get(project_path)?;
        let mut id = id.to_lowercase();
        let mut service = services.get(&id)?;

        // Aliases are followed a single step
        if service.class_name.is_none() {
            if let Some(target) = &service.alias {
                id = target.to_lowercase();
                service = services.get(&id)?;
            }
        }

        Some(ServiceDefinition {
            id,
            class_name: service.class_name.clone()?,
            public: service.public,
            tags: service.tags.clone(),
        })
    }
}
