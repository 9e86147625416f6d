//! Conversion of findings into reference records and their handoff to the index

use mago_span::Span;
use symdex_core::{IndexSink, ReferenceKind, ReferenceRecord, Route, ServiceEntry};
use tracing::debug;

use crate::controller::{TemplateVariable, VariableKind};
use crate::metadata;
use crate::text::truncate_view_path;

/// One-way channel from the indexer to an `IndexSink`
///
/// Records are forwarded as soon as they are built, in traversal order.
pub struct ReferenceEmitter<'s> {
    sink: &'s mut dyn IndexSink,
}

impl<'s> ReferenceEmitter<'s> {
    pub fn new(sink: &'s mut dyn IndexSink) -> Self {
        Self { sink }
    }

    pub fn emit(&mut self, record: ReferenceRecord) {
        self.sink.add_reference(record);
    }

    /// A namespace path discovered through the class loader, without textual anchor
    pub fn namespace(&mut self, path: &str) {
        self.emit(ReferenceRecord::unanchored(ReferenceKind::Namespace, path));
    }

    /// A kernel environment declared at `span` of `module_path`
    pub fn environment(&mut self, name: &str, span: Span, module_path: &str) {
        debug!("indexing environment: {} => {}", name, module_path);
        self.emit(
            ReferenceRecord::spanning(ReferenceKind::Environment, span, name)
                .with_secondary_path(module_path),
        );
    }

    /// A view or route method spanning its declaration
    pub fn method(&mut self, kind: ReferenceKind, name: &str, span: Span) {
        self.emit(ReferenceRecord::spanning(kind, span, name));
    }

    pub fn template_variable(&mut self, variable: &TemplateVariable) {
        let view_path = truncate_view_path(&variable.view_path);
        let payload = match &variable.kind {
            VariableKind::Reference {
                class_name,
                namespace,
            } => {
                let payload =
                    metadata::reference(class_name, namespace, &variable.view_path, &variable.method);
                debug!(
                    "add reference info: {} => {} with metadata {}",
                    variable.name, view_path, payload
                );
                payload
            }
            VariableKind::Scalar => {
                let payload = metadata::scalar(&variable.name, &variable.view_path, &variable.method);
                debug!(
                    "add scalar info: {} => {} with metadata: {}",
                    variable.name, view_path, payload
                );
                payload
            }
        };

        self.emit(
            ReferenceRecord::new(
                ReferenceKind::TemplateVariable,
                variable.offset,
                variable.length,
                variable.name.clone(),
            )
            .with_metadata(payload)
            .with_secondary_path(view_path),
        );
    }

    pub fn route(&mut self, route: Route, project_path: &str) {
        debug!("indexing route: {} {}", route.name, route.pattern);
        self.sink.add_route(route, project_path);
    }

    pub fn end_routes(&mut self) {
        self.sink.exit_routes();
    }

    pub fn service(&mut self, entry: ServiceEntry) {
        self.sink.add_service(entry);
    }

    pub fn end_services(&mut self) {
        self.sink.exit_services();
    }
}
