//! Indexer configuration
//!
//! Loaded from the `[index]` table of `.symdex.toml` by the CLI; every field
//! falls back to the Symfony 2 defaults.

use serde::Deserialize;

/// Names the extractors match against
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Class whose instantiation declares an environment (`new AppKernel('prod', ...)`)
    pub kernel_class: String,
    /// Controller methods that render a template (`$this->render(...)`)
    pub render_methods: Vec<String>,
    /// Class-loader methods registering namespace paths
    pub namespace_registrars: Vec<String>,
    /// Container method registering a service alias
    pub alias_method: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            kernel_class: "AppKernel".to_string(),
            render_methods: vec![
                "render".to_string(),
                "renderView".to_string(),
                "stream".to_string(),
            ],
            namespace_registrars: vec![
                "registerNamespaces".to_string(),
                "registerNamespaceFallbacks".to_string(),
            ],
            alias_method: "setAlias".to_string(),
        }
    }
}

impl IndexerConfig {
    /// PHP method names are case-insensitive
    pub fn is_render_method(&self, name: &str) -> bool {
        self.render_methods.iter().any(|m| m.eq_ignore_ascii_case(name))
    }

    pub fn is_namespace_registrar(&self, name: &str) -> bool {
        self.namespace_registrars
            .iter()
            .any(|m| m.eq_ignore_ascii_case(name))
    }

    pub fn is_alias_method(&self, name: &str) -> bool {
        self.alias_method.eq_ignore_ascii_case(name)
    }

    pub fn is_kernel_class(&self, name: &str) -> bool {
        self.kernel_class.trim_start_matches('\\') == name.trim_start_matches('\\')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::default();
        assert!(config.is_kernel_class("AppKernel"));
        assert!(config.is_kernel_class("\\AppKernel"));
        assert!(!config.is_kernel_class("Kernel"));
        assert!(config.is_render_method("renderView"));
        assert!(config.is_render_method("RENDER"));
        assert!(config.is_namespace_registrar("registerNamespaceFallbacks"));
        assert!(config.is_alias_method("setAlias"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: IndexerConfig =
            serde_json::from_str(r#"{ "kernel_class": "Kernel" }"#).unwrap();
        assert_eq!(config.kernel_class, "Kernel");
        assert_eq!(config.alias_method, "setAlias");
        assert_eq!(config.render_methods.len(), 3);
    }
}
