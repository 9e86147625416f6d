//! Controller analysis
//!
//! A `ControllerAnalyzer` is created for every class-like declaration and
//! walks its members on its own. It collects the variables a controller hands
//! to its templates, the methods taking view paths or dealing with routes,
//! and the routes declared with `@Route`. Nothing is emitted until `finish`
//! is called at class exit.

mod annotations;
mod route;
mod template_variable;

pub use annotations::{doc_comment_before, parse_doc_block, AnnotationArguments, DocTag};
pub use route::{default_route_name, method_routes, route_prefix};
pub use template_variable::{default_view_path, TemplateVariable, VariableKind};

use std::collections::HashMap;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;
use symdex_core::{ReferenceKind, Route, Visitor};
use tracing::debug;

use crate::config::IndexerConfig;
use crate::context::{ClassRef, NameResolver};
use crate::emitter::ReferenceEmitter;
use crate::syntax::{array_elements, instantiated_class, is_this, member_name, plain_variable, string_value};
use crate::text::{namespace_of, short_name};

/// State of the method currently being walked
struct MethodScope {
    name: String,
    /// View path implied by `@Template`, if the method carries one
    template_view: Option<String>,
    /// `$variable` -> fully qualified class it was assigned an instance of
    instances: HashMap<String, String>,
}

/// A method flagged as taking a view path or dealing with routes
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlaggedMethod {
    kind: ReferenceKind,
    name: String,
    span: Span,
}

pub struct ControllerAnalyzer<'c> {
    config: &'c IndexerConfig,
    class: ClassRef,
    resolver: NameResolver,
    route_prefix: Option<String>,
    method: Option<MethodScope>,
    flagged: Vec<FlaggedMethod>,
    variables: Vec<TemplateVariable>,
    routes: Vec<Route>,
}

impl<'c> ControllerAnalyzer<'c> {
    /// `class_doc` is the doc block of the class declaration, if any
    pub fn new(
        config: &'c IndexerConfig,
        class: ClassRef,
        resolver: NameResolver,
        class_doc: Option<&str>,
    ) -> Self {
        let route_prefix = class_doc.and_then(|doc| route_prefix(&parse_doc_block(doc)));
        Self {
            config,
            class,
            resolver,
            route_prefix,
            method: None,
            flagged: Vec::new(),
            variables: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Walk the members of a class-like statement
    pub fn analyze<'a>(&mut self, stmt: &Statement<'a>, source: &str) {
        self.traverse_statement(stmt, source);
        self.method = None;
    }

    /// Emit everything collected for the class, then close the route batch
    pub fn finish(self, emitter: &mut ReferenceEmitter<'_>, project_path: &str) {
        for method in &self.flagged {
            emitter.method(method.kind, &method.name, method.span);
        }

        for variable in &self.variables {
            emitter.template_variable(variable);
        }

        for route in self.routes {
            emitter.route(route, project_path);
        }
        emitter.end_routes();
    }

    fn enter_method(&mut self, method: &Method<'_>, source: &str) {
        let name = method.name.value.to_string();
        let span = method.span();

        let tags = doc_comment_before(source, span.start.offset as usize)
            .map(parse_doc_block)
            .unwrap_or_default();

        let mut template_view = None;
        for tag in &tags {
            if let Some((type_name, variable)) = tag.typed_variable() {
                if variable == "$view" && type_name == "string" {
                    self.flag(ReferenceKind::ViewMethod, &name, span);
                } else if tag.value.contains("route") || tag.value.contains("url") {
                    self.flag(ReferenceKind::RouteMethod, &name, span);
                }
            }

            if tag.is("Template") {
                template_view = tag
                    .arguments()
                    .and_then(|args| args.value().map(str::to_string))
                    .or_else(|| {
                        default_view_path(self.class.namespace.as_deref(), &self.class.name, &name)
                    });
                if template_view.is_none() {
                    debug!(
                        "Unable to guess the template of {}::{}",
                        self.class.qualified_name(),
                        name
                    );
                }
            }
        }

        let controller = self.class.qualified_name();
        self.routes.extend(method_routes(
            &tags,
            self.route_prefix.as_deref(),
            &controller,
            &name,
        ));

        self.method = Some(MethodScope {
            name,
            template_view,
            instances: HashMap::new(),
        });
    }

    fn flag(&mut self, kind: ReferenceKind, name: &str, span: Span) {
        if self.flagged.iter().any(|m| m.kind == kind && m.name == name) {
            return;
        }
        self.flagged.push(FlaggedMethod {
            kind,
            name: name.to_string(),
            span,
        });
    }

    fn track_assignment(&mut self, assignment: &Assignment<'_>, source: &str) {
        let Some(variable) = plain_variable(&assignment.lhs) else {
            return;
        };
        let class_name = match &*assignment.rhs {
            Expression::Instantiation(inst) => {
                instantiated_class(inst, source).map(|name| self.resolver.resolve(name))
            }
            _ => None,
        };
        let Some(method) = self.method.as_mut() else {
            return;
        };
        match class_name {
            Some(class_name) => {
                method.instances.insert(variable.to_string(), class_name);
            }
            None => {
                method.instances.remove(variable);
            }
        }
    }

    fn render_call(&mut self, arguments: &ArgumentList<'_>, source: &str) {
        let mut values = arguments.arguments.iter().map(|arg| arg.value());
        let Some(view_path) = values.next().and_then(string_value) else {
            return;
        };
        if let Some(parameters) = values.next() {
            self.bind_array(parameters, &view_path, source);
        }
    }

    fn bind_array(&mut self, array: &Expression<'_>, view_path: &str, source: &str) {
        let Some(elements) = array_elements(array) else {
            return;
        };
        for element in elements {
            if let ArrayElement::KeyValue(kv) = element {
                let Some(name) = string_value(&kv.key) else {
                    continue;
                };
                self.bind(name, &kv.value, view_path, element.span(), source);
            }
        }
    }

    fn bind(&mut self, name: String, value: &Expression<'_>, view_path: &str, span: Span, source: &str) {
        let Some(method) = self.method.as_ref() else {
            return;
        };
        let Some(kind) = self.classify(value, method, source) else {
            debug!(
                "Unable to resolve template variable {} in {}::{}",
                name,
                self.class.qualified_name(),
                method.name
            );
            return;
        };

        let offset = span.start.offset as u32;
        let variable = TemplateVariable {
            name,
            kind,
            method: method.name.clone(),
            view_path: view_path.to_string(),
            offset,
            length: (span.end.offset as u32).saturating_sub(offset),
        };

        if !self.variables.iter().any(|v| v.same_binding(&variable)) {
            self.variables.push(variable);
        }
    }

    fn classify(&self, value: &Expression<'_>, method: &MethodScope, source: &str) -> Option<VariableKind> {
        let class_name = match value {
            Expression::Literal(_) => return Some(VariableKind::Scalar),
            Expression::Parenthesized(paren) => return self.classify(&paren.expression, method, source),
            Expression::Instantiation(inst) => self.resolver.resolve(instantiated_class(inst, source)?),
            _ => method.instances.get(plain_variable(value)?)?.clone(),
        };

        Some(VariableKind::Reference {
            class_name: short_name(&class_name).to_string(),
            namespace: namespace_of(&class_name).to_string(),
        })
    }
}

impl<'a, 'c> Visitor<'a> for ControllerAnalyzer<'c> {
    fn visit_statement(&mut self, stmt: &Statement<'a>, source: &str) -> bool {
        if let Statement::Return(ret) = stmt {
            let view_path = self
                .method
                .as_ref()
                .and_then(|method| method.template_view.clone());
            if let (Some(view_path), Some(value)) = (view_path, &ret.value) {
                self.bind_array(value, &view_path, source);
            }
        }
        true
    }

    fn visit_class_like_member(&mut self, member: &ClassLikeMember<'a>, source: &str) -> bool {
        match member {
            ClassLikeMember::Method(method) => {
                self.enter_method(method, source);
                true
            }
            _ => false,
        }
    }

    fn visit_expression(&mut self, expr: &Expression<'a>, source: &str) -> bool {
        match expr {
            Expression::Assignment(assignment) => {
                self.track_assignment(assignment, source);
            }
            Expression::Call(Call::Method(call)) => {
                let is_render = is_this(&call.object)
                    && member_name(&call.method).is_some_and(|name| self.config.is_render_method(name));
                if is_render {
                    self.render_call(&call.argument_list, source);
                }
            }
            _ => {}
        }
        true
    }
}
