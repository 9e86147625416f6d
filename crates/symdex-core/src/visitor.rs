//! AST visitor for traversing PHP syntax trees
//!
//! Provides a trait-based visitor pattern with pre-order `visit_*` hooks that
//! decide whether to descend, and post-order `leave_*` hooks that fire once a
//! node's children have been walked. Default implementations own the
//! recursion; indexers override only the hooks they care about.

use mago_syntax::ast::*;

/// Trait for visiting PHP AST nodes
///
/// `visit_*` methods return `true` to continue traversal into children.
/// `leave_*` methods are only called for nodes whose `visit_*` returned `true`.
pub trait Visitor<'a> {
    /// Called before the first top-level statement. Return `false` to skip the module.
    fn enter_program(&mut self, _program: &Program<'a>, _source: &str) -> bool {
        true
    }

    /// Called after the last top-level statement
    fn leave_program(&mut self, _program: &Program<'a>, _source: &str) {}

    /// Called for each statement. Return `true` to continue traversal into children.
    fn visit_statement(&mut self, _stmt: &Statement<'a>, _source: &str) -> bool {
        true
    }

    /// Called after a statement's children have been traversed
    fn leave_statement(&mut self, _stmt: &Statement<'a>, _source: &str) {}

    /// Called for each member of a class, interface, trait or enum.
    fn visit_class_like_member(&mut self, _member: &ClassLikeMember<'a>, _source: &str) -> bool {
        true
    }

    /// Called for each expression. Return `true` to continue traversal into children.
    fn visit_expression(&mut self, _expr: &Expression<'a>, _source: &str) -> bool {
        true
    }

    /// Visit a program (entry point)
    fn visit_program(&mut self, program: &Program<'a>, source: &str) {
        if !self.enter_program(program, source) {
            return;
        }

        for stmt in program.statements.iter() {
            self.traverse_statement(stmt, source);
        }

        self.leave_program(program, source);
    }

    /// Traverse a statement and its children
    fn traverse_statement(&mut self, stmt: &Statement<'a>, source: &str) {
        if !self.visit_statement(stmt, source) {
            return;
        }

        match stmt {
            Statement::Expression(expr_stmt) => {
                self.traverse_expression(&expr_stmt.expression, source);
            }
            Statement::Block(block) => {
                for inner in block.statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
            Statement::If(if_stmt) => {
                self.traverse_expression(&if_stmt.condition, source);
                self.traverse_if_body(&if_stmt.body, source);
            }
            Statement::Foreach(foreach) => {
                self.traverse_expression(&foreach.expression, source);
                self.traverse_foreach_body(&foreach.body, source);
            }
            Statement::For(for_stmt) => {
                for expr in for_stmt.initializations.iter() {
                    self.traverse_expression(expr, source);
                }
                for expr in for_stmt.conditions.iter() {
                    self.traverse_expression(expr, source);
                }
                for expr in for_stmt.increments.iter() {
                    self.traverse_expression(expr, source);
                }
                self.traverse_for_body(&for_stmt.body, source);
            }
            Statement::While(while_stmt) => {
                self.traverse_expression(&while_stmt.condition, source);
                self.traverse_while_body(&while_stmt.body, source);
            }
            Statement::DoWhile(do_while) => {
                self.traverse_statement(&do_while.statement, source);
                self.traverse_expression(&do_while.condition, source);
            }
            Statement::Class(class) => {
                for member in class.members.iter() {
                    self.traverse_class_like_member(member, source);
                }
            }
            Statement::Interface(iface) => {
                for member in iface.members.iter() {
                    self.traverse_class_like_member(member, source);
                }
            }
            Statement::Trait(tr) => {
                for member in tr.members.iter() {
                    self.traverse_class_like_member(member, source);
                }
            }
            Statement::Enum(enum_def) => {
                for member in enum_def.members.iter() {
                    self.traverse_class_like_member(member, source);
                }
            }
            Statement::Function(func) => {
                for inner in func.body.statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
            Statement::Namespace(ns) => {
                let statements = match &ns.body {
                    NamespaceBody::Implicit(body) => &body.statements,
                    NamespaceBody::BraceDelimited(body) => &body.statements,
                };
                for inner in statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
            Statement::Try(try_stmt) => {
                for inner in try_stmt.block.statements.iter() {
                    self.traverse_statement(inner, source);
                }
                for catch in try_stmt.catch_clauses.iter() {
                    for inner in catch.block.statements.iter() {
                        self.traverse_statement(inner, source);
                    }
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    for inner in finally.block.statements.iter() {
                        self.traverse_statement(inner, source);
                    }
                }
            }
            Statement::Switch(switch) => {
                self.traverse_expression(&switch.expression, source);
                self.traverse_switch_body(&switch.body, source);
            }
            Statement::Return(ret) => {
                if let Some(expr) = &ret.value {
                    self.traverse_expression(expr, source);
                }
            }
            Statement::Echo(echo) => {
                for expr in echo.values.iter() {
                    self.traverse_expression(expr, source);
                }
            }
            _ => {}
        }

        self.leave_statement(stmt, source);
    }

    /// Traverse an if body
    fn traverse_if_body(&mut self, body: &IfBody<'a>, source: &str) {
        match body {
            IfBody::Statement(stmt_body) => {
                self.traverse_statement(stmt_body.statement, source);
                for else_if in stmt_body.else_if_clauses.iter() {
                    self.traverse_expression(&else_if.condition, source);
                    self.traverse_statement(else_if.statement, source);
                }
                if let Some(else_clause) = &stmt_body.else_clause {
                    self.traverse_statement(else_clause.statement, source);
                }
            }
            IfBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.traverse_statement(inner, source);
                }
                for else_if in block.else_if_clauses.iter() {
                    self.traverse_expression(&else_if.condition, source);
                    for inner in else_if.statements.iter() {
                        self.traverse_statement(inner, source);
                    }
                }
                if let Some(else_clause) = &block.else_clause {
                    for inner in else_clause.statements.iter() {
                        self.traverse_statement(inner, source);
                    }
                }
            }
        }
    }

    /// Traverse a foreach body
    fn traverse_foreach_body(&mut self, body: &ForeachBody<'a>, source: &str) {
        match body {
            ForeachBody::Statement(stmt) => {
                self.traverse_statement(stmt, source);
            }
            ForeachBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
        }
    }

    /// Traverse a for body
    fn traverse_for_body(&mut self, body: &ForBody<'a>, source: &str) {
        match body {
            ForBody::Statement(stmt) => {
                self.traverse_statement(stmt, source);
            }
            ForBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
        }
    }

    /// Traverse a while body
    fn traverse_while_body(&mut self, body: &WhileBody<'a>, source: &str) {
        match body {
            WhileBody::Statement(stmt) => {
                self.traverse_statement(stmt, source);
            }
            WhileBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
        }
    }

    /// Traverse a switch body
    fn traverse_switch_body(&mut self, body: &SwitchBody<'a>, source: &str) {
        match body {
            SwitchBody::BraceDelimited(block) => {
                for case in block.cases.iter() {
                    for stmt in case.statements().iter() {
                        self.traverse_statement(stmt, source);
                    }
                }
            }
            SwitchBody::ColonDelimited(block) => {
                for case in block.cases.iter() {
                    for stmt in case.statements().iter() {
                        self.traverse_statement(stmt, source);
                    }
                }
            }
        }
    }

    /// Traverse a class-like member
    fn traverse_class_like_member(&mut self, member: &ClassLikeMember<'a>, source: &str) {
        if !self.visit_class_like_member(member, source) {
            return;
        }

        if let ClassLikeMember::Method(method) = member {
            match &method.body {
                MethodBody::Concrete(body) => {
                    for inner in body.statements.iter() {
                        self.traverse_statement(inner, source);
                    }
                }
                MethodBody::Abstract(_) => {}
            }
        }
    }

    /// Traverse the arguments of a call or instantiation
    fn traverse_arguments(&mut self, arguments: &ArgumentList<'a>, source: &str) {
        for arg in arguments.arguments.iter() {
            self.traverse_expression(arg.value(), source);
        }
    }

    /// Traverse an expression and its children
    fn traverse_expression(&mut self, expr: &Expression<'a>, source: &str) {
        if !self.visit_expression(expr, source) {
            return;
        }

        match expr {
            Expression::Call(Call::Function(func_call)) => {
                self.traverse_arguments(&func_call.argument_list, source);
            }
            Expression::Call(Call::Method(method_call)) => {
                self.traverse_expression(&method_call.object, source);
                self.traverse_arguments(&method_call.argument_list, source);
            }
            Expression::Call(Call::NullSafeMethod(method_call)) => {
                self.traverse_expression(&method_call.object, source);
                self.traverse_arguments(&method_call.argument_list, source);
            }
            Expression::Call(Call::StaticMethod(static_call)) => {
                self.traverse_arguments(&static_call.argument_list, source);
            }
            Expression::Instantiation(inst) => {
                if let Some(arguments) = &inst.argument_list {
                    self.traverse_arguments(arguments, source);
                }
            }
            Expression::UnaryPrefix(unary) => {
                self.traverse_expression(&unary.operand, source);
            }
            Expression::UnaryPostfix(unary) => {
                self.traverse_expression(&unary.operand, source);
            }
            Expression::Parenthesized(paren) => {
                self.traverse_expression(&paren.expression, source);
            }
            Expression::Binary(binary) => {
                self.traverse_expression(&binary.lhs, source);
                self.traverse_expression(&binary.rhs, source);
            }
            Expression::Conditional(ternary) => {
                self.traverse_expression(&ternary.condition, source);
                if let Some(if_expr) = &ternary.then {
                    self.traverse_expression(if_expr, source);
                }
                self.traverse_expression(&ternary.r#else, source);
            }
            Expression::Assignment(assign) => {
                self.traverse_expression(&assign.lhs, source);
                self.traverse_expression(&assign.rhs, source);
            }
            Expression::ArrayAccess(access) => {
                self.traverse_expression(&access.array, source);
                self.traverse_expression(&access.index, source);
            }
            Expression::Array(arr) => {
                for elem in arr.elements.iter() {
                    self.traverse_array_element(elem, source);
                }
            }
            Expression::LegacyArray(arr) => {
                for elem in arr.elements.iter() {
                    self.traverse_array_element(elem, source);
                }
            }
            Expression::Closure(closure) => {
                for inner in closure.body.statements.iter() {
                    self.traverse_statement(inner, source);
                }
            }
            Expression::ArrowFunction(arrow) => {
                self.traverse_expression(&arrow.expression, source);
            }
            _ => {}
        }
    }

    /// Traverse a single array element
    fn traverse_array_element(&mut self, elem: &ArrayElement<'a>, source: &str) {
        match elem {
            ArrayElement::KeyValue(kv) => {
                self.traverse_expression(&kv.key, source);
                self.traverse_expression(&kv.value, source);
            }
            ArrayElement::Value(val) => {
                self.traverse_expression(&val.value, source);
            }
            ArrayElement::Variadic(var) => {
                self.traverse_expression(&var.value, source);
            }
            _ => {}
        }
    }
}

/// Helper function to run a visitor on a program
pub fn visit<'a, V: Visitor<'a>>(visitor: &mut V, program: &Program<'a>, source: &str) {
    visitor.visit_program(program, source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use mago_database::file::FileId;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip_classes: bool,
    }

    impl<'a> Visitor<'a> for Recorder {
        fn visit_statement(&mut self, stmt: &Statement<'a>, _source: &str) -> bool {
            match stmt {
                Statement::Namespace(_) => self.events.push("enter namespace".to_string()),
                Statement::Class(class) => {
                    self.events.push(format!("enter class {}", class.name.value));
                    return !self.skip_classes;
                }
                _ => {}
            }
            true
        }

        fn leave_statement(&mut self, stmt: &Statement<'a>, _source: &str) {
            match stmt {
                Statement::Namespace(_) => self.events.push("leave namespace".to_string()),
                Statement::Class(class) => {
                    self.events.push(format!("leave class {}", class.name.value))
                }
                _ => {}
            }
        }

        fn visit_expression(&mut self, expr: &Expression<'a>, _source: &str) -> bool {
            if let Expression::Instantiation(_) = expr {
                self.events.push("new".to_string());
            }
            true
        }
    }

    fn record(source: &str, skip_classes: bool) -> Vec<String> {
        let arena = Bump::new();
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, source);
        let mut recorder = Recorder {
            skip_classes,
            ..Default::default()
        };
        visit(&mut recorder, program, source);
        recorder.events
    }

    #[test]
    fn test_enter_and_leave_are_nested() {
        let source = r#"<?php
namespace Acme {
    class Foo {
        public function bar() {
            return new Baz();
        }
    }
}
"#;
        assert_eq!(
            record(source, false),
            vec![
                "enter namespace",
                "enter class Foo",
                "new",
                "leave class Foo",
                "leave namespace",
            ]
        );
    }

    #[test]
    fn test_skipped_node_is_not_left() {
        let source = r#"<?php
class Foo {
    public function bar() {
        return new Baz();
    }
}
"#;
        assert_eq!(record(source, true), vec!["enter class Foo"]);
    }

    #[test]
    fn test_method_call_arguments_are_traversed() {
        let source = r#"<?php
$loader->register(array('a' => new Foo()), [new Bar()]);
"#;
        assert_eq!(record(source, false), vec!["new", "new"]);
    }
}
