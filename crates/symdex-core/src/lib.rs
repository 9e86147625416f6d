//! symdex-core: Core abstractions for indexing Symfony PHP sources
//!
//! This crate provides:
//! - `Visitor`: Trait for traversing PHP AST with enter/leave hooks
//! - `ReferenceRecord`: A positioned fact extracted from a source module
//! - `IndexSink`, `ServiceLookup`, `ProjectNature`: the narrow interfaces the
//!   indexer talks to the outside world through
//! - `MemoryIndex`: An in-memory `IndexSink` used by the CLI and tests

mod reference;
mod sink;
pub mod visitor;

pub use reference::{ReferenceKind, ReferenceRecord, Route, ServiceDefinition, ServiceEntry, SourceModule};
pub use sink::{IndexSink, MemoryIndex, NatureError, ProjectNature, ServiceLookup};
pub use visitor::{visit, Visitor};
