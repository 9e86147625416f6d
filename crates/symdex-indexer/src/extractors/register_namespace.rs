//! Namespace paths registered with the class loader
//!
//! ```php
//! $loader->registerNamespaces(array(
//!     'Symfony' => array(__DIR__.'/../vendor/symfony/src', __DIR__.'/../vendor/bundles'),
//!     'Acme'    => __DIR__.'/../src',
//! ));
//! ```
//!
//! Every path reachable from the arguments is resolved against the module's
//! directory and reported once.

use mago_span::HasSpan;
use mago_syntax::ast::*;
use symdex_core::Visitor;
use tracing::debug;

use super::ExtractionContext;
use crate::emitter::ReferenceEmitter;
use crate::syntax::{span_text, string_value};

/// Registration calls in this file are never indexed
pub const BOOTSTRAP_FILE: &str = "bootstrap.php";

/// Emit the namespace paths of a registrar call
///
/// Returns `false` for the bootstrap file, whose statement is not descended into.
pub fn extract(
    call: &MethodCall<'_>,
    ctx: &ExtractionContext<'_>,
    emitter: &mut ReferenceEmitter<'_>,
) -> bool {
    if ctx.module.file_name() == BOOTSTRAP_FILE {
        return false;
    }

    let directory = ctx.module.directory().to_string_lossy().replace('\\', "/");
    let mut collector = NamespaceCollector::new(ctx.source, &directory);
    collector.traverse_arguments(&call.argument_list, ctx.source);

    for path in collector.into_paths() {
        debug!("indexing namespace path: {}", path);
        emitter.namespace(&path);
    }
    true
}

/// Collects the path values reachable from a registrar call's arguments
struct NamespaceCollector<'d> {
    source: &'d str,
    directory: &'d str,
    paths: Vec<String>,
}

impl<'d> NamespaceCollector<'d> {
    fn new(source: &'d str, directory: &'d str) -> Self {
        Self {
            source,
            directory,
            paths: Vec::new(),
        }
    }

    fn into_paths(self) -> Vec<String> {
        self.paths
    }

    fn path_value(&self, expr: &Expression<'_>) -> Option<String> {
        if span_text(self.source, expr.span()).trim().eq_ignore_ascii_case("__DIR__") {
            if self.directory.is_empty() {
                return Some(".".to_string());
            }
            return Some(self.directory.to_string());
        }

        match expr {
            Expression::Literal(Literal::String(_)) => string_value(expr),
            Expression::Binary(binary) if matches!(binary.operator, BinaryOperator::StringConcat(_)) => {
                let lhs = self.path_value(&binary.lhs)?;
                let rhs = self.path_value(&binary.rhs)?;
                Some(lhs + &rhs)
            }
            Expression::Parenthesized(paren) => self.path_value(&paren.expression),
            _ => None,
        }
    }
}

impl<'a, 'd> Visitor<'a> for NamespaceCollector<'d> {
    fn visit_expression(&mut self, expr: &Expression<'a>, _source: &str) -> bool {
        if let Some(path) = self.path_value(expr) {
            let path = normalize_path(&path);
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
            return false;
        }
        matches!(expr, Expression::Array(_) | Expression::LegacyArray(_))
    }

    /// Keys name namespaces, values hold the paths
    fn traverse_array_element(&mut self, elem: &ArrayElement<'a>, source: &str) {
        match elem {
            ArrayElement::KeyValue(kv) => self.traverse_expression(&kv.value, source),
            ArrayElement::Value(val) => self.traverse_expression(&val.value, source),
            _ => {}
        }
    }
}

/// Fold `.` and `..` segments without touching the filesystem
///
/// Leading `..` segments of a relative path are kept.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            _ => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
