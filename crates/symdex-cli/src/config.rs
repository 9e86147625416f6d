//! Configuration file support for symdex
//!
//! Loads `.symdex.toml` from the project directory or its parents.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use symdex_indexer::IndexerConfig;

pub const CONFIG_FILE: &str = ".symdex.toml";

/// Configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexerConfig,
    pub paths: PathsConfig,
    pub services: ServicesConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from indexing
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Service definition files, relative to the project root
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text" or "json"
    pub format: Option<String>,
}

impl Config {
    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: &Path) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Service files to load when none are configured
    pub fn service_files(&self) -> Vec<PathBuf> {
        if self.services.files.is_empty() {
            return vec![
                PathBuf::from("app/config/services.yml"),
                PathBuf::from("config/services.yaml"),
            ];
        }
        self.services.files.clone()
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns match at any depth
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            r#"
[index]
kernel_class = "Kernel"
render_methods = ["render"]

[paths]
exclude = ["vendor/", "app/cache/"]

[services]
files = ["app/config/services.yml", "app/config/admin.yml"]

[output]
format = "json"
"#,
        )
        .unwrap();

        let (config, path) = Config::load_from(temp.path()).unwrap().unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.index.kernel_class, "Kernel");
        assert_eq!(config.index.render_methods, vec!["render".to_string()]);
        assert_eq!(config.index.alias_method, "setAlias");
        assert_eq!(config.paths.exclude.len(), 2);
        assert_eq!(config.service_files().len(), 2);
        assert_eq!(config.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_found_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[output]\nformat = \"text\"\n").unwrap();
        let nested = temp.path().join("src/Acme");
        fs::create_dir_all(&nested).unwrap();

        let (_, path) = Config::load_from(&nested).unwrap().unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "").unwrap();

        let (config, _) = Config::load_from(temp.path()).unwrap().unwrap();
        assert_eq!(config.index, IndexerConfig::default());
        assert!(config.paths.exclude.is_empty());
        assert_eq!(
            config.service_files(),
            vec![
                PathBuf::from("app/config/services.yml"),
                PathBuf::from("config/services.yaml"),
            ]
        );
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[index\nkernel_class = ").unwrap();
        assert!(Config::load_from(temp.path()).is_err());
    }

    #[test]
    fn test_should_exclude() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["vendor/".to_string(), "*Test.php".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("project/vendor/autoload.php")));
        assert!(config.should_exclude(Path::new("vendor/symfony/src/Kernel.php")));
        assert!(config.should_exclude(Path::new("src/Acme/Tests/PostControllerTest.php")));
        assert!(!config.should_exclude(Path::new("src/Acme/Controller/PostController.php")));
    }
}
