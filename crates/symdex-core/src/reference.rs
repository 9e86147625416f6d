//! Reference records and the entities forwarded to the index

use mago_span::Span;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of fact a reference record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A namespace path registered with the class loader
    Namespace,
    /// A kernel environment (`new AppKernel('prod', ...)`)
    Environment,
    /// A variable handed from a controller to a template
    TemplateVariable,
    /// A method accepting a view path (`@param string $view`)
    ViewMethod,
    /// A method dealing with routes or urls
    RouteMethod,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Namespace => "namespace",
            ReferenceKind::Environment => "environment",
            ReferenceKind::TemplateVariable => "template_variable",
            ReferenceKind::ViewMethod => "view_method",
            ReferenceKind::RouteMethod => "route_method",
        }
    }
}

/// A typed, positioned fact extracted from a source module
///
/// `offset`/`length` describe a byte span inside the module, or are both zero
/// when the fact has no single textual anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub kind: ReferenceKind,
    pub offset: u32,
    pub length: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_path: Option<String>,
}

impl ReferenceRecord {
    /// Create a record with an explicit offset and length
    pub fn new(kind: ReferenceKind, offset: u32, length: u32, name: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            length,
            name: name.into(),
            metadata: None,
            secondary_path: None,
        }
    }

    /// Create a record anchored to a source span
    pub fn spanning(kind: ReferenceKind, span: Span, name: impl Into<String>) -> Self {
        let offset = span.start.offset as u32;
        let length = (span.end.offset as u32).saturating_sub(offset);
        Self::new(kind, offset, length, name)
    }

    /// Create a record without a textual anchor
    pub fn unanchored(kind: ReferenceKind, name: impl Into<String>) -> Self {
        Self::new(kind, 0, 0, name)
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn with_secondary_path(mut self, path: impl Into<String>) -> Self {
        self.secondary_path = Some(path.into());
        self
    }

    /// Byte offset one past the end of the anchored span
    pub fn end_offset(&self) -> u32 {
        self.offset + self.length
    }
}

/// A declarative binding from a URL pattern to a controller method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub pattern: String,
    /// Fully qualified controller class
    pub controller: String,
    /// Controller method name
    pub action: String,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            controller: controller.into(),
            action: action.into(),
        }
    }
}

/// A service definition as known to the dependency-injection registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub id: String,
    pub class_name: String,
    pub public: bool,
    pub tags: Vec<String>,
}

impl ServiceDefinition {
    /// Visibility flag in the textual form the index stores
    pub fn public_string(&self) -> &'static str {
        if self.public {
            "true"
        } else {
            "false"
        }
    }
}

/// A service alias forwarded to the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub alias_id: String,
    pub class_name: String,
    pub visibility: String,
    pub tags: Vec<String>,
    pub project_path: String,
}

impl ServiceEntry {
    /// Expose `service` under `alias_id` for the given project
    pub fn alias(alias_id: impl Into<String>, service: &ServiceDefinition, project_path: &str) -> Self {
        Self {
            alias_id: alias_id.into(),
            class_name: service.class_name.clone(),
            visibility: service.public_string().to_string(),
            tags: service.tags.clone(),
            project_path: project_path.to_string(),
        }
    }
}

/// The source module being indexed and the project it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    /// Module path, relative to the project root when possible
    pub path: PathBuf,
    /// Identity of the owning project
    pub project_path: String,
}

impl SourceModule {
    pub fn new(path: impl Into<PathBuf>, project_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            project_path: project_path.into(),
        }
    }

    /// File name of the module (`bootstrap.php`, ...)
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }

    /// Directory containing the module
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Module path with forward slashes, as stored in the index
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanchored_record_has_zero_span() {
        let record = ReferenceRecord::unanchored(ReferenceKind::Namespace, "src");
        assert_eq!(record.offset, 0);
        assert_eq!(record.length, 0);
        assert!(record.metadata.is_none());
    }

    #[test]
    fn test_service_entry_copies_definition() {
        let service = ServiceDefinition {
            id: "doctrine.orm.default_entity_manager".to_string(),
            class_name: "Doctrine\\ORM\\EntityManager".to_string(),
            public: false,
            tags: vec!["orm".to_string()],
        };
        let entry = ServiceEntry::alias("doctrine.orm.entity_manager", &service, "/acme");
        assert_eq!(entry.alias_id, "doctrine.orm.entity_manager");
        assert_eq!(entry.class_name, "Doctrine\\ORM\\EntityManager");
        assert_eq!(entry.visibility, "false");
        assert_eq!(entry.tags, vec!["orm".to_string()]);
        assert_eq!(entry.project_path, "/acme");
    }

    #[test]
    fn test_source_module_paths() {
        let module = SourceModule::new("app/autoload.php", "/acme");
        assert_eq!(module.file_name(), "autoload.php");
        assert_eq!(module.directory(), Path::new("app"));
        assert_eq!(module.path_string(), "app/autoload.php");
    }
}
