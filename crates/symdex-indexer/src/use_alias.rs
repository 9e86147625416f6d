//! Import (`use`) statement handling
//!
//! Each imported class is bound under its explicit alias, or under the last
//! segment of its fully qualified name. Function and constant imports are
//! not class aliases and are skipped.

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::context::ScopeTracker;
use crate::syntax::span_text;

/// Local binding name of an import: the alias, or the last path segment
pub fn local_name<'n>(fqn: &'n str, alias: Option<&'n str>) -> &'n str {
    match alias {
        Some(alias) => alias,
        None => match fqn.rfind('\\') {
            Some(index) => &fqn[index + 1..],
            None => fqn,
        },
    }
}

/// Record every class import of `use_stmt` in the innermost alias frame
pub fn record_use(scope: &mut ScopeTracker, use_stmt: &Use<'_>, source: &str) {
    match &use_stmt.items {
        UseItems::Sequence(seq) => {
            for item in seq.items.iter() {
                record_item(scope, item, None, source);
            }
        }
        UseItems::TypedSequence(typed_seq) => {
            if typed_seq.r#type.is_function() || typed_seq.r#type.is_const() {
                return;
            }
            for item in typed_seq.items.iter() {
                record_item(scope, item, None, source);
            }
        }
        UseItems::TypedList(typed_list) => {
            if typed_list.r#type.is_function() || typed_list.r#type.is_const() {
                return;
            }
            let prefix = span_text(source, typed_list.namespace.span());
            for item in typed_list.items.iter() {
                record_item(scope, item, Some(prefix), source);
            }
        }
        UseItems::MixedList(mixed_list) => {
            let prefix = span_text(source, mixed_list.namespace.span());
            for maybe_typed in mixed_list.items.iter() {
                if let Some(use_type) = &maybe_typed.r#type {
                    if use_type.is_function() || use_type.is_const() {
                        continue;
                    }
                }
                record_item(scope, &maybe_typed.item, Some(prefix), source);
            }
        }
    }
}

fn record_item(scope: &mut ScopeTracker, item: &UseItem<'_>, prefix: Option<&str>, source: &str) {
    let name = span_text(source, item.name.span()).trim_start_matches('\\');
    let fqn = match prefix {
        Some(prefix) => format!("{}\\{}", prefix.trim_start_matches('\\').trim_end_matches('\\'), name),
        None => name.to_string(),
    };
    let alias = item
        .alias
        .as_ref()
        .map(|a| span_text(source, a.identifier.span()));

    let local = local_name(&fqn, alias).to_string();
    scope.add_alias(local, fqn);
}

/// Whether a block declares imports of its own
pub fn declares_imports(block: &Block<'_>) -> bool {
    block
        .statements
        .iter()
        .any(|stmt| matches!(stmt, Statement::Use(_)))
}
