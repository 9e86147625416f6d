//! symdex-indexer: Symfony indexing engine
//!
//! Walks a parsed PHP module and reports the facts a Symfony-aware editor
//! needs:
//!
//! - namespace paths registered with the class loader (`registerNamespaces`)
//! - service aliases (`$container->setAlias('alias', 'service')`)
//! - kernel environments (`new AppKernel('prod', false)`)
//! - variables handed from controllers to templates
//! - methods taking view paths or dealing with routes, and `@Route` declarations
//!
//! # Example
//!
//! ```no_run
//! use symdex_core::{MemoryIndex, SourceModule};
//! use symdex_indexer::{Indexer, IndexerConfig};
//!
//! # fn run(program: &mago_syntax::ast::Program<'_>, source: &str) {
//! let config = IndexerConfig::default();
//! let indexer = Indexer::new(&config, &true, &());
//! let module = SourceModule::new("src/Acme/DemoBundle/Controller/DemoController.php", "/acme");
//!
//! let mut index = MemoryIndex::new();
//! indexer.index_program(program, source, &module, &mut index);
//! # }
//! ```

pub mod config;
pub mod context;
pub mod controller;
pub mod emitter;
pub mod extractors;
mod indexer;
pub mod metadata;
pub mod syntax;
pub mod text;
pub mod use_alias;

pub use config::IndexerConfig;
pub use context::{ClassRef, NameResolver, ScopeTracker};
pub use emitter::ReferenceEmitter;
pub use indexer::{Indexer, ModuleIndexer};
