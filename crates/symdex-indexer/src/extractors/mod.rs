//! Pattern matchers for single expressions
//!
//! Each extractor recognizes one Symfony idiom and emits what it finds. They
//! share no state; the module indexer hands them an `ExtractionContext`
//! describing the module being walked.

pub mod kernel;
pub mod register_namespace;
pub mod set_alias;

use mago_syntax::ast::*;
use symdex_core::{ServiceLookup, SourceModule};

use crate::config::IndexerConfig;
use crate::emitter::ReferenceEmitter;
use crate::syntax::{member_name, plain_variable};

/// What an extractor may consult while matching
pub struct ExtractionContext<'x> {
    pub module: &'x SourceModule,
    pub config: &'x IndexerConfig,
    pub services: &'x dyn ServiceLookup,
    pub source: &'x str,
}

/// `$variable->name(...)`, the receiver shape every call extractor expects
pub fn variable_method_call<'x, 'a>(
    expr: &'x Expression<'a>,
) -> Option<(&'x MethodCall<'a>, &'x str)> {
    if let Expression::Call(Call::Method(call)) = expr {
        plain_variable(&call.object)?;
        let name = member_name(&call.method)?;
        return Some((call, name));
    }
    None
}

/// Run the call extractors on the expression of an expression statement
///
/// Returns `false` when the statement must not be descended into.
pub fn extract_statement(
    expr: &Expression<'_>,
    ctx: &ExtractionContext<'_>,
    emitter: &mut ReferenceEmitter<'_>,
) -> bool {
    let Some((call, name)) = variable_method_call(expr) else {
        return true;
    };

    if ctx.config.is_namespace_registrar(name) {
        return register_namespace::extract(call, ctx, emitter);
    }
    if ctx.config.is_alias_method(name) {
        set_alias::extract(call, ctx, emitter);
    }
    true
}
