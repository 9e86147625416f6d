//! Interfaces between the indexer and its host

use crate::reference::{ReferenceRecord, Route, ServiceDefinition, ServiceEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while establishing whether a project carries the framework marker
#[derive(Error, Debug)]
pub enum NatureError {
    #[error("Project {0} is not accessible")]
    Inaccessible(String),

    #[error("Failed to read project descriptor {path}: {message}")]
    Descriptor { path: String, message: String },
}

/// Answers "does this project opt into framework indexing?"
pub trait ProjectNature: Send + Sync {
    fn has_framework_marker(&self, project_path: &str) -> Result<bool, NatureError>;
}

/// Fixed answer, for hosts that already know the project's nature
impl ProjectNature for bool {
    fn has_framework_marker(&self, _project_path: &str) -> Result<bool, NatureError> {
        Ok(*self)
    }
}

/// Looks up service definitions of the dependency-injection container
pub trait ServiceLookup: Send + Sync {
    fn find_service(&self, id: &str, project_path: &str) -> Option<ServiceDefinition>;
}

/// A lookup that never finds anything
impl ServiceLookup for () {
    fn find_service(&self, _id: &str, _project_path: &str) -> Option<ServiceDefinition> {
        None
    }
}

/// Receiver of everything the indexer discovers
///
/// Route and service additions are grouped in batches; the indexer signals
/// the end of each batch explicitly.
pub trait IndexSink {
    fn add_reference(&mut self, record: ReferenceRecord);

    fn add_route(&mut self, route: Route, project_path: &str);

    fn exit_routes(&mut self);

    fn add_service(&mut self, entry: ServiceEntry);

    fn exit_services(&mut self);
}

/// In-memory index that keeps records in emission order
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryIndex {
    pub references: Vec<ReferenceRecord>,
    pub routes: Vec<(Route, String)>,
    pub services: Vec<ServiceEntry>,
    /// Number of completed route batches
    pub route_batches: usize,
    /// Number of completed service batches
    pub service_batches: usize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.routes.is_empty() && self.services.is_empty()
    }

    /// References of the given kind, in emission order
    pub fn references_of(&self, kind: crate::ReferenceKind) -> Vec<&ReferenceRecord> {
        self.references.iter().filter(|r| r.kind == kind).collect()
    }

    /// Append everything `other` collected
    pub fn merge(&mut self, other: MemoryIndex) {
        self.references.extend(other.references);
        self.routes.extend(other.routes);
        self.services.extend(other.services);
        self.route_batches += other.route_batches;
        self.service_batches += other.service_batches;
    }
}

impl IndexSink for MemoryIndex {
    fn add_reference(&mut self, record: ReferenceRecord) {
        self.references.push(record);
    }

    fn add_route(&mut self, route: Route, project_path: &str) {
        self.routes.push((route, project_path.to_string()));
    }

    fn exit_routes(&mut self) {
        self.route_batches += 1;
    }

    fn add_service(&mut self, entry: ServiceEntry) {
        self.services.push(entry);
    }

    fn exit_services(&mut self) {
        self.service_batches += 1;
    }
}
