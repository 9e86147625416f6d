//! Kernel environments
//!
//! Front controllers boot the kernel with `new AppKernel('prod', false)`; the
//! first argument names an environment of the project.

use mago_span::Span;
use mago_syntax::ast::*;

use super::ExtractionContext;
use crate::emitter::ReferenceEmitter;
use crate::syntax::{instantiated_class, literal_scalar};
use crate::text::remove_quotes;

/// Emit the environment of a kernel instantiation spanning `span`
pub fn extract(
    inst: &Instantiation<'_>,
    span: Span,
    ctx: &ExtractionContext<'_>,
    emitter: &mut ReferenceEmitter<'_>,
) {
    let Some(class_name) = instantiated_class(inst, ctx.source) else {
        return;
    };
    if !ctx.config.is_kernel_class(class_name) {
        return;
    }

    let Some(first) = inst
        .argument_list
        .as_ref()
        .and_then(|list| list.arguments.iter().next())
    else {
        return;
    };
    let Some(environment) = literal_scalar(first.value(), ctx.source) else {
        return;
    };

    emitter.environment(&remove_quotes(environment), span, &ctx.module.path_string());
}
