//! Service aliases registered on the container
//!
//! `$container->setAlias('mailer', 'swiftmailer.mailer.default')` exposes an
//! existing service under a second id. The alias is only indexed when the
//! aliased service is known to the registry.

use mago_syntax::ast::*;
use symdex_core::ServiceEntry;

use super::ExtractionContext;
use crate::emitter::ReferenceEmitter;
use crate::syntax::{literal_scalar, positional_arguments};
use crate::text::{remove_quotes, strip_quotes};

/// Forward the alias declared by `call`; anything but two literal arguments is ignored
pub fn extract(call: &MethodCall<'_>, ctx: &ExtractionContext<'_>, emitter: &mut ReferenceEmitter<'_>) {
    let Some(arguments) = positional_arguments(&call.argument_list) else {
        return;
    };
    let [alias, reference] = arguments.as_slice() else {
        return;
    };
    let (Some(alias), Some(reference)) = (
        literal_scalar(alias, ctx.source),
        literal_scalar(reference, ctx.source),
    ) else {
        return;
    };

    let alias_id = remove_quotes(alias);
    let project_path = ctx.module.project_path.as_str();
    if let Some(service) = ctx.services.find_service(strip_quotes(reference), project_path) {
        emitter.service(ServiceEntry::alias(alias_id, &service, project_path));
        emitter.end_services();
    }
}
