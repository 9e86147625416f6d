//! Module indexing
//!
//! `Indexer` holds what is shared across a project; `ModuleIndexer` carries
//! the state of a single module walk and is built fresh for every module.

use mago_span::HasSpan;
use mago_syntax::ast::*;
use symdex_core::{IndexSink, ProjectNature, ServiceLookup, SourceModule, Visitor};
use tracing::{debug, warn};

use crate::config::IndexerConfig;
use crate::context::{ClassRef, ScopeTracker};
use crate::controller::{doc_comment_before, ControllerAnalyzer};
use crate::emitter::ReferenceEmitter;
use crate::extractors::{self, kernel, ExtractionContext};
use crate::syntax::span_text;
use crate::use_alias::{declares_imports, record_use};

/// Entry point for hosts: indexes modules one at a time
pub struct Indexer<'c> {
    config: &'c IndexerConfig,
    nature: &'c dyn ProjectNature,
    services: &'c dyn ServiceLookup,
}

impl<'c> Indexer<'c> {
    pub fn new(
        config: &'c IndexerConfig,
        nature: &'c dyn ProjectNature,
        services: &'c dyn ServiceLookup,
    ) -> Self {
        Self {
            config,
            nature,
            services,
        }
    }

    /// Index one parsed module into `sink`
    pub fn index_program<'a>(
        &self,
        program: &Program<'a>,
        source: &str,
        module: &SourceModule,
        sink: &mut dyn IndexSink,
    ) {
        let indexer = ModuleIndexer::new(self.config, self.nature, self.services, module, sink);
        indexer.index_module(program, source);
    }
}

/// Traversal state of a single module
pub struct ModuleIndexer<'m> {
    config: &'m IndexerConfig,
    services: &'m dyn ServiceLookup,
    module: &'m SourceModule,
    emitter: ReferenceEmitter<'m>,
    scope: ScopeTracker,
    /// One analyzer per enclosing class-like declaration
    controllers: Vec<ControllerAnalyzer<'m>>,
    enabled: bool,
}

impl<'m> ModuleIndexer<'m> {
    pub fn new(
        config: &'m IndexerConfig,
        nature: &dyn ProjectNature,
        services: &'m dyn ServiceLookup,
        module: &'m SourceModule,
        sink: &'m mut dyn IndexSink,
    ) -> Self {
        let enabled = match nature.has_framework_marker(&module.project_path) {
            Ok(marker) => marker,
            Err(err) => {
                warn!("Skipping {}: {}", module.path.display(), err);
                false
            }
        };

        Self {
            config,
            services,
            module,
            emitter: ReferenceEmitter::new(sink),
            scope: ScopeTracker::new(),
            controllers: Vec::new(),
            enabled,
        }
    }

    /// Walk the module, emitting as it goes
    pub fn index_module<'a>(mut self, program: &Program<'a>, source: &str) {
        if !self.enabled {
            debug!("{} is not part of a Symfony project", self.module.path.display());
        }
        self.visit_program(program, source);
    }

    fn extraction_context<'x>(&self, source: &'x str) -> ExtractionContext<'x>
    where
        'm: 'x,
    {
        ExtractionContext {
            module: self.module,
            config: self.config,
            services: self.services,
            source,
        }
    }

    fn enter_class_like<'a>(&mut self, stmt: &Statement<'a>, name: &str, source: &str) {
        let namespace = self.scope.namespace().map(str::to_string);
        let class = self.scope.enter_class(ClassRef::new(name, namespace)).clone();
        let doc = doc_comment_before(source, stmt.span().start.offset as usize);

        let mut analyzer = ControllerAnalyzer::new(self.config, class, self.scope.resolver(), doc);
        analyzer.analyze(stmt, source);
        self.controllers.push(analyzer);
    }

    fn exit_class_like(&mut self) {
        if let Some(analyzer) = self.controllers.pop() {
            analyzer.finish(&mut self.emitter, &self.module.project_path);
        }
        self.scope.exit_class();
    }
}

fn namespace_name(ns: &Namespace<'_>, source: &str) -> Option<String> {
    let name = ns.name.as_ref()?;
    let name = span_text(source, name.span()).trim().trim_start_matches('\\');
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

fn is_class_like(stmt: &Statement<'_>) -> bool {
    matches!(
        stmt,
        Statement::Class(_) | Statement::Interface(_) | Statement::Trait(_) | Statement::Enum(_)
    )
}

impl<'a, 'm> Visitor<'a> for ModuleIndexer<'m> {
    fn enter_program(&mut self, _program: &Program<'a>, _source: &str) -> bool {
        if !self.enabled {
            return false;
        }
        self.scope.enter_module();
        true
    }

    fn leave_program(&mut self, _program: &Program<'a>, _source: &str) {
        self.scope.exit_module();
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>, source: &str) -> bool {
        match stmt {
            Statement::Namespace(ns) => {
                self.scope.enter_namespace(namespace_name(ns, source));
                true
            }
            Statement::Use(use_stmt) => {
                record_use(&mut self.scope, use_stmt, source);
                false
            }
            Statement::Block(block) => {
                if declares_imports(block) {
                    self.scope.push_block();
                }
                true
            }
            Statement::Class(class) => {
                self.enter_class_like(stmt, class.name.value, source);
                true
            }
            Statement::Interface(iface) => {
                self.enter_class_like(stmt, iface.name.value, source);
                true
            }
            Statement::Trait(tr) => {
                self.enter_class_like(stmt, tr.name.value, source);
                true
            }
            Statement::Enum(enum_def) => {
                self.enter_class_like(stmt, enum_def.name.value, source);
                true
            }
            Statement::Expression(expr_stmt) => {
                let ctx = self.extraction_context(source);
                extractors::extract_statement(&expr_stmt.expression, &ctx, &mut self.emitter)
            }
            _ => true,
        }
    }

    fn leave_statement(&mut self, stmt: &Statement<'a>, _source: &str) {
        match stmt {
            Statement::Namespace(_) => self.scope.exit_namespace(),
            Statement::Block(block) if declares_imports(block) => self.scope.pop_block(),
            _ if is_class_like(stmt) => self.exit_class_like(),
            _ => {}
        }
    }

    fn visit_expression(&mut self, expr: &Expression<'a>, source: &str) -> bool {
        if let Expression::Instantiation(inst) = expr {
            let ctx = self.extraction_context(source);
            kernel::extract(inst, expr.span(), &ctx, &mut self.emitter);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use mago_database::file::FileId;
    use symdex_core::{MemoryIndex, NatureError, ReferenceKind};

    fn index_with(source: &str, module_path: &str, nature: &dyn ProjectNature) -> MemoryIndex {
        let arena = Bump::new();
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, source);

        let config = IndexerConfig::default();
        let indexer = Indexer::new(&config, nature, &());
        let module = SourceModule::new(module_path, "/acme");

        let mut index = MemoryIndex::new();
        indexer.index_program(program, source, &module, &mut index);
        index
    }

    fn index(source: &str) -> MemoryIndex {
        index_with(source, "src/Acme/BlogBundle/Controller/PostController.php", &true)
    }

    struct BrokenProject;

    impl ProjectNature for BrokenProject {
        fn has_framework_marker(&self, project_path: &str) -> Result<bool, NatureError> {
            Err(NatureError::Inaccessible(project_path.to_string()))
        }
    }

    const CONTROLLER: &str = r#"<?php
namespace Acme\BlogBundle\Controller;

use Acme\BlogBundle\Entity\Post;
use Symfony\Bundle\FrameworkBundle\Controller\Controller;

class PostController extends Controller
{
    public function showAction()
    {
        $post = new Post();
        return $this->render('AcmeBlogBundle:Post:show.html.twig', array('post' => $post));
    }
}
"#;

    #[test]
    fn test_without_framework_marker_nothing_is_emitted() {
        assert!(index_with(CONTROLLER, "Controller.php", &false).is_empty());
        assert_eq!(index_with(CONTROLLER, "Controller.php", &false).route_batches, 0);
    }

    #[test]
    fn test_nature_failure_skips_module() {
        let index = index_with(CONTROLLER, "Controller.php", &BrokenProject);
        assert!(index.is_empty());
        assert_eq!(index.route_batches, 0);
    }

    #[test]
    fn test_controller_variables_resolve_imports() {
        let index = index(CONTROLLER);
        let variables = index.references_of(ReferenceKind::TemplateVariable);
        assert_eq!(variables.len(), 1);

        let metadata = crate::metadata::parse(variables[0].metadata.as_deref().unwrap()).unwrap();
        assert_eq!(
            metadata,
            crate::metadata::Metadata::Reference {
                class_name: "Post".to_string(),
                namespace: "Acme\\BlogBundle\\Entity".to_string(),
                view_path: "AcmeBlogBundle:Post:show.html.twig".to_string(),
                method: "showAction".to_string(),
            }
        );
        assert_eq!(index.route_batches, 1);
    }

    #[test]
    fn test_braced_namespaces_do_not_share_imports() {
        let source = r#"<?php
namespace Acme\BlogBundle\Entity {
    use Vendor\Model\Post;
}

namespace Acme\BlogBundle\Controller {
    class PostController
    {
        public function showAction()
        {
            return $this->render('AcmeBlogBundle:Post:show.html.twig', array('post' => new Post()));
        }
    }
}
"#;
        let index = index(source);
        let variables = index.references_of(ReferenceKind::TemplateVariable);
        let metadata = crate::metadata::parse(variables[0].metadata.as_deref().unwrap()).unwrap();
        assert!(matches!(
            metadata,
            crate::metadata::Metadata::Reference { ref namespace, .. }
                if namespace == "Acme\\BlogBundle\\Controller"
        ));
    }

    #[test]
    fn test_kernel_in_front_controller() {
        let source = "<?php\nrequire_once __DIR__.'/../app/AppKernel.php';\n$kernel = new AppKernel('prod', false);\n$kernel->handle(Request::createFromGlobals())->send();\n";
        let index = index_with(source, "web/app.php", &true);
        let environments = index.references_of(ReferenceKind::Environment);
        assert_eq!(environments.len(), 1);
        assert_eq!(environments[0].name, "prod");
        assert_eq!(environments[0].secondary_path.as_deref(), Some("web/app.php"));
    }

    #[test]
    fn test_kernel_inside_function_body() {
        let source = "<?php\nfunction boot() {\n    return new AppKernel('test', true);\n}\n";
        let index = index_with(source, "app/boot.php", &true);
        assert_eq!(index.references_of(ReferenceKind::Environment).len(), 1);
    }

    #[test]
    fn test_each_class_exit_closes_a_route_batch() {
        let source = "<?php\ninterface A {}\ntrait B {}\nclass C {}\n";
        assert_eq!(index(source).route_batches, 3);
    }
}
