//! Indented AST dump used by `kalang check --print-ast`

use crate::ast::*;
use core_types::Span;
use std::fmt::Write;

/// Render `program` as an indented tree, one node per line
///
/// ```
/// use ka_compiler::{parse_source, pretty::pretty_print};
///
/// let program = parse_source("x = 1").unwrap();
/// let dump = pretty_print(&program);
/// assert!(dump.starts_with("Program @1:1-1:5\n"));
/// assert!(dump.contains("    Assign = @1:1-1:5\n"));
/// ```
pub fn pretty_print(program: &Program) -> String {
    let mut printer = Printer::default();
    printer.line(&format!("Program {}", at(program.span)));
    printer.nested(|p| {
        for stmt in &program.body {
            p.statement(stmt);
        }
    });
    printer.out
}

fn at(span: Span) -> String {
    format!("@{}-{}", span.start, span.end)
}

#[derive(Default)]
struct Printer {
    out: String,
    level: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}{}", "  ".repeat(self.level), text);
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }

    fn block(&mut self, label: &str, block: &Block) {
        self.line(&format!("{label} {}", at(block.span)));
        self.nested(|p| {
            for stmt in &block.body {
                p.statement(stmt);
            }
        });
    }

    fn params(&mut self, params: &[Identifier]) {
        if !params.is_empty() {
            let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            self.line(&format!("params {}", names.join(", ")));
        }
    }

    fn statement(&mut self, stmt: &Statement) {
        let span = at(stmt.span());
        match stmt {
            Statement::Expression { expression, .. } => {
                self.line(&format!("ExpressionStatement {span}"));
                self.nested(|p| p.expression(expression));
            }
            Statement::Block(block) => self.block("Block", block),
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.line(&format!("If {span}"));
                self.nested(|p| {
                    p.expression(condition);
                    p.block("Then", then_branch);
                    if let Some(else_branch) = else_branch {
                        p.line("Else");
                        p.nested(|p| p.statement(else_branch));
                    }
                });
            }
            Statement::For {
                variable,
                iterable,
                body,
                ..
            } => {
                self.line(&format!("For {} {span}", variable.name));
                self.nested(|p| {
                    p.expression(iterable);
                    p.block("Body", body);
                });
            }
            Statement::While {
                condition, body, ..
            } => {
                self.line(&format!("While {span}"));
                self.nested(|p| {
                    p.expression(condition);
                    p.block("Body", body);
                });
            }
            Statement::Return { argument, .. } => {
                self.line(&format!("Return {span}"));
                if let Some(argument) = argument {
                    self.nested(|p| p.expression(argument));
                }
            }
            Statement::Break { .. } => self.line(&format!("Break {span}")),
            Statement::Continue { .. } => self.line(&format!("Continue {span}")),
            Statement::FunctionDeclaration {
                name, params, body, ..
            } => {
                self.line(&format!("FunctionDeclaration {} {span}", name.name));
                self.nested(|p| {
                    p.params(params);
                    p.block("Body", body);
                });
            }
            Statement::ClassDeclaration { name, members, .. } => {
                self.line(&format!("ClassDeclaration {} {span}", name.name));
                self.nested(|p| {
                    for member in members {
                        p.member(member);
                    }
                });
            }
            Statement::ExternDeclaration { name, kind, .. } => {
                let kind = match kind {
                    ExternKind::Variable => "variable",
                    ExternKind::Class => "class",
                };
                self.line(&format!("Extern {kind} {} {span}", name.name));
            }
            Statement::Import {
                source,
                names,
                kind,
                ..
            } => {
                let path: Vec<&str> = source.iter().map(|s| s.name.as_str()).collect();
                let names: Vec<&str> = names.iter().map(|s| s.name.as_str()).collect();
                self.line(&format!(
                    "Import {:?} {} [{}] {span}",
                    kind,
                    path.join("."),
                    names.join(", ")
                ));
            }
            Statement::Export { declaration, .. } => {
                self.line(&format!("Export {span}"));
                self.nested(|p| p.statement(declaration));
            }
            Statement::Guarded {
                statement,
                condition,
                ..
            } => {
                self.line(&format!("Guarded {span}"));
                self.nested(|p| {
                    p.statement(statement);
                    p.line("When");
                    p.nested(|p| p.expression(condition));
                });
            }
        }
    }

    fn member(&mut self, member: &ClassMember) {
        let span = at(member.span());
        match member {
            ClassMember::Field { name, value, .. } => {
                self.line(&format!("Field {} {span}", name.name));
                self.nested(|p| p.expression(value));
            }
            ClassMember::Method {
                name, params, body, ..
            } => {
                let name = match name {
                    MethodName::Identifier(ident) => ident.name.clone(),
                    MethodName::Operator(op, _) => format!("\"{}\"", op.as_str()),
                };
                self.line(&format!("Method {name} {span}"));
                self.nested(|p| {
                    p.params(params);
                    p.block("Body", body);
                });
            }
        }
    }

    fn expression(&mut self, expr: &Expression) {
        let span = at(expr.span());
        match expr {
            Expression::String { value, .. } => self.line(&format!("String {:?} {span}", value)),
            Expression::Number { value, .. } => self.line(&format!("Number {value} {span}")),
            Expression::Variable { name, .. } => self.line(&format!("Variable {name} {span}")),
            Expression::Array { items, .. } => {
                self.line(&format!("Array {span}"));
                self.nested(|p| items.iter().for_each(|item| p.expression(item)));
            }
            Expression::Object { fields, .. } => {
                self.line(&format!("Object {span}"));
                self.nested(|p| {
                    for field in fields {
                        p.line(&format!("{:?}:", field.key));
                        p.nested(|p| p.expression(&field.value));
                    }
                });
            }
            Expression::PropertyAccess {
                object, property, ..
            } => {
                self.line(&format!("PropertyAccess .{} {span}", property.name));
                self.nested(|p| p.expression(object));
            }
            Expression::Assign {
                target,
                operator,
                value,
                is_local,
                ..
            } => {
                let op = match operator {
                    AssignmentOperator::Assign => "=".to_string(),
                    AssignmentOperator::Compound(op) => format!("{}=", op.as_str()),
                };
                let local = if *is_local { " local" } else { "" };
                self.line(&format!("Assign {op}{local} {span}"));
                self.nested(|p| {
                    p.expression(target);
                    p.expression(value);
                });
            }
            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => {
                self.line(&format!("Binary {} {span}", operator.as_str()));
                self.nested(|p| {
                    p.expression(left);
                    p.expression(right);
                });
            }
            Expression::Unary {
                operator, operand, ..
            } => {
                self.line(&format!("Unary {} {span}", operator.as_str()));
                self.nested(|p| p.expression(operand));
            }
            Expression::Lambda { params, body, .. } => {
                self.line(&format!("Lambda {span}"));
                self.nested(|p| {
                    p.params(params);
                    p.block("Body", body);
                });
            }
            Expression::Call {
                callee, arguments, ..
            } => {
                self.line(&format!("Call {span}"));
                self.nested(|p| {
                    p.expression(callee);
                    arguments.iter().for_each(|arg| p.expression(arg));
                });
            }
            Expression::New {
                callee, arguments, ..
            } => {
                self.line(&format!("New {span}"));
                self.nested(|p| {
                    p.expression(callee);
                    arguments.iter().for_each(|arg| p.expression(arg));
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    #[test]
    fn test_pretty_print_nesting() {
        let program = parse_source("for i in 0..3 do print(i) end").unwrap();
        let dump = pretty_print(&program);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "Program @1:1-1:29");
        assert_eq!(lines[1], "  For i @1:1-1:29");
        assert_eq!(lines[2], "    Binary .. @1:10-1:13");
        assert!(lines.contains(&"          Variable i @1:24-1:24"));
    }

    #[test]
    fn test_pretty_print_empty_program() {
        let program = parse_source("").unwrap();
        assert_eq!(pretty_print(&program), "Program @1:1-1:1\n");
    }
}
