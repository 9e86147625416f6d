//! Typed views over generic AST nodes
//!
//! Every helper returns `None` when the node does not have the expected
//! shape, so extractors state their predicates as a chain of `?`.

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use crate::text::strip_quotes;

/// Source text covered by a span
pub fn span_text(source: &str, span: Span) -> &str {
    &source[span.start.offset as usize..span.end.offset as usize]
}

/// Raw text of a literal scalar (string, integer or float), quotes included
pub fn literal_scalar<'s>(expr: &Expression<'_>, source: &'s str) -> Option<&'s str> {
    match expr {
        Expression::Literal(Literal::String(_))
        | Expression::Literal(Literal::Integer(_))
        | Expression::Literal(Literal::Float(_)) => Some(span_text(source, expr.span())),
        _ => None,
    }
}

/// Unquoted value of a plain string literal
pub fn string_value(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Literal(Literal::String(string_lit)) => {
            if let Some(value) = string_lit.value {
                return Some(value.to_string());
            }
            Some(strip_quotes(string_lit.raw).to_string())
        }
        Expression::Parenthesized(paren) => string_value(&paren.expression),
        _ => None,
    }
}

/// Name of a plain `$variable`, including the dollar sign
pub fn plain_variable<'x>(expr: &'x Expression<'_>) -> Option<&'x str> {
    if let Expression::Variable(Variable::Direct(var)) = expr {
        return Some(var.name);
    }
    None
}

/// Whether the expression is `$this`
pub fn is_this(expr: &Expression<'_>) -> bool {
    plain_variable(expr) == Some("$this")
}

/// Statically known member name (`->name(...)`)
pub fn member_name<'x>(selector: &'x ClassLikeMemberSelector<'_>) -> Option<&'x str> {
    match selector {
        ClassLikeMemberSelector::Identifier(ident) => Some(ident.value),
        _ => None,
    }
}

/// Class name as written in a `new` expression (`Post`, `\\AppKernel`)
pub fn instantiated_class<'s>(inst: &Instantiation<'_>, source: &'s str) -> Option<&'s str> {
    match &inst.class {
        Expression::Identifier(ident) => Some(span_text(source, ident.span())),
        _ => None,
    }
}

/// All arguments, if every one of them is positional
pub fn positional_arguments<'x, 'a>(list: &'x ArgumentList<'a>) -> Option<Vec<&'x Expression<'a>>> {
    let mut values = Vec::new();
    for arg in list.arguments.iter() {
        match arg {
            Argument::Positional(pos) => values.push(&pos.value),
            Argument::Named(_) => return None,
        }
    }
    Some(values)
}

/// Elements of an array literal, short (`[...]`) or long (`array(...)`)
pub fn array_elements<'x, 'a>(expr: &'x Expression<'a>) -> Option<Vec<&'x ArrayElement<'a>>> {
    match expr {
        Expression::Array(array) => Some(array.elements.iter().collect()),
        Expression::LegacyArray(array) => Some(array.elements.iter().collect()),
        Expression::Parenthesized(paren) => array_elements(&paren.expression),
        _ => None,
    }
}
