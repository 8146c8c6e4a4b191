//! JavaScript generation from AST
//!
//! Output layout is fixed: the range helper, the operator dispatch table,
//! hoisted top-level declarations, then the program body. Every binary and
//! unary operator goes through `__kaOperators` so operands can overload it;
//! member access never does.

use crate::ast::*;
use crate::error::transpiling_error;
use crate::scope::{ScopeId, ScopeKind, ScopeTree, SymbolKind};
use core_types::{CompileResult, Span};

/// Name of the generated operator dispatch table
pub const OPERATOR_TABLE: &str = "__kaOperators";

/// Name of the generated range helper
pub const RANGE_HELPER: &str = "__kaGetRange";

/// Arrays whose rendered items add up to at most this many characters stay on one line
const INLINE_ARRAY_LIMIT: usize = 10;

/// Answers whether a file exists; supplied by the caller so the transpiler does no I/O
pub trait FileExists {
    /// Whether a file exists at `path`
    fn exists(&self, path: &str) -> bool;
}

impl<F> FileExists for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, path: &str) -> bool {
        self(path)
    }
}

/// Transpiler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Path of the file being compiled; imports resolve relative to its directory
    pub file_path: String,
    /// Spaces per indentation level
    pub indent_width: usize,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            file_path: "<main>".to_string(),
            indent_width: 4,
        }
    }
}

/// Converts a KaLang program to JavaScript source
pub struct Transpiler<'a> {
    program: &'a Program,
    options: TranspileOptions,
    oracle: Option<&'a dyn FileExists>,
    scopes: ScopeTree,
    indent_level: usize,
}

impl<'a> Transpiler<'a> {
    /// Create a transpiler with default options and no file oracle
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            options: TranspileOptions::default(),
            oracle: None,
            scopes: ScopeTree::new(),
            indent_level: 0,
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: TranspileOptions) -> Self {
        self.options = options;
        self
    }

    /// Provide the oracle used to resolve imports
    pub fn with_oracle(mut self, oracle: &'a dyn FileExists) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Generate JavaScript for the whole program
    pub fn transpile(&mut self) -> CompileResult<String> {
        self.scopes = ScopeTree::new();
        self.indent_level = 0;

        let program = self.program;
        let body = self.emit_statements(&program.body)?;

        let mut out = runtime_preamble(&self.indent(1));
        out.push_str(&self.hoisted_declarations(0));
        out.push_str(&body);

        tracing::debug!(
            file = %self.options.file_path,
            bytes = out.len(),
            "transpiled program"
        );
        Ok(out)
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(self.options.indent_width * level)
    }

    fn emit_statements(&mut self, body: &[Statement]) -> CompileResult<String> {
        let mut lines = Vec::with_capacity(body.len());
        for stmt in body {
            let line = self.visit_statement(stmt)?;
            if !line.is_empty() {
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }

    fn hoisted_declarations(&self, id: ScopeId) -> String {
        let indent = self.indent(self.indent_level);
        self.scopes
            .scope(id)
            .hoisted_names()
            .map(|name| format!("{indent}let {name};\n"))
            .collect()
    }

    /// Statements of a braced body, one level deeper and in a fresh scope
    fn emit_scoped(
        &mut self,
        body: &[Statement],
        kind: ScopeKind,
        params: &[Identifier],
    ) -> CompileResult<String> {
        self.indent_level += 1;
        let id = self.scopes.enter_scope(kind);
        for param in params {
            self.scopes
                .declare(&param.name, SymbolKind::Variable, param.span.start);
        }

        let statements = self.emit_statements(body)?;
        let mut out = self.hoisted_declarations(id);
        out.push_str(&statements);

        self.scopes.exit_scope();
        self.indent_level -= 1;
        Ok(out)
    }

    /// `head { inner }`, closing brace at the current indentation
    fn braced(&self, head: &str, inner: &str) -> String {
        let open = if head.is_empty() {
            "{".to_string()
        } else {
            format!("{head} {{")
        };
        if inner.is_empty() {
            format!("{open}}}")
        } else {
            format!("{open}\n{inner}\n{}}}", self.indent(self.indent_level))
        }
    }

    fn visit_statement(&mut self, stmt: &Statement) -> CompileResult<String> {
        let indent = self.indent(self.indent_level);

        match stmt {
            Statement::Expression { expression, .. } => {
                let code = self.visit_expression(expression)?;
                // Keep JS from reading a leading `{` or `function` as a statement.
                if code.starts_with('{') || code.starts_with("function") {
                    Ok(format!("{indent}({code});"))
                } else {
                    Ok(format!("{indent}{code};"))
                }
            }

            Statement::Block(block) => {
                let inner = self.emit_scoped(&block.body, ScopeKind::Block, &[])?;
                Ok(format!("{indent}{}", self.braced("", &inner)))
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let condition = self.visit_expression(condition)?;
                let then_code = self.emit_scoped(&then_branch.body, ScopeKind::Block, &[])?;
                let mut out = format!(
                    "{indent}{}",
                    self.braced(&format!("if ({condition})"), &then_code)
                );

                if let Some(else_branch) = else_branch {
                    let else_code = match else_branch.as_ref() {
                        Statement::Block(block) => {
                            self.emit_scoped(&block.body, ScopeKind::Block, &[])?
                        }
                        chained => {
                            self.indent_level += 1;
                            let code = self.visit_statement(chained);
                            self.indent_level -= 1;
                            code?
                        }
                    };
                    out.push(' ');
                    out.push_str(&self.braced("else", &else_code));
                }

                Ok(out)
            }

            Statement::For {
                variable,
                iterable,
                body,
                span,
            } => {
                self.scopes.assign(&variable.name, span.start, false);
                let iterable = self.visit_expression(iterable)?;
                let inner = self.emit_scoped(&body.body, ScopeKind::Block, &[])?;
                let head = format!("for ({} of {iterable})", variable.name);
                Ok(format!("{indent}{}", self.braced(&head, &inner)))
            }

            Statement::While {
                condition, body, ..
            } => {
                let condition = self.visit_expression(condition)?;
                let inner = self.emit_scoped(&body.body, ScopeKind::Block, &[])?;
                let head = format!("while ({condition})");
                Ok(format!("{indent}{}", self.braced(&head, &inner)))
            }

            Statement::Return { argument, .. } => match argument {
                Some(value) => {
                    let value = self.visit_expression(value)?;
                    Ok(format!("{indent}return {value};"))
                }
                None => Ok(format!("{indent}return;")),
            },

            Statement::Break { .. } => Ok(format!("{indent}break;")),

            Statement::Continue { .. } => Ok(format!("{indent}continue;")),

            Statement::FunctionDeclaration {
                name,
                params,
                body,
                span,
            } => {
                self.scopes
                    .declare(&name.name, SymbolKind::Function, span.start);
                let inner = self.emit_scoped(&body.body, ScopeKind::Function, params)?;
                let head = format!("function {}({})", name.name, join_params(params));
                Ok(format!("{indent}{}", self.braced(&head, &inner)))
            }

            Statement::ClassDeclaration {
                name,
                members,
                span,
            } => {
                self.scopes.declare(&name.name, SymbolKind::Class, span.start);
                self.scopes.enter_scope(ScopeKind::Class);
                self.indent_level += 1;

                let mut lines = Vec::with_capacity(members.len());
                for member in members {
                    lines.push(self.visit_class_member(member)?);
                }

                self.indent_level -= 1;
                self.scopes.exit_scope();

                let head = format!("class {}", name.name);
                Ok(format!("{indent}{}", self.braced(&head, &lines.join("\n"))))
            }

            Statement::ExternDeclaration { name, kind, .. } => {
                self.scopes.declare_extern(&name.name, *kind);
                Ok(String::new())
            }

            Statement::Import {
                source,
                names,
                kind,
                span,
            } => {
                let resolved = self.resolve_import(source, *span)?;
                for name in names {
                    self.scopes
                        .declare(&name.name, SymbolKind::Variable, name.span.start);
                }

                let names = names
                    .iter()
                    .map(|n| n.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let binding = match kind {
                    ImportKind::Module => format!("* as {names}"),
                    ImportKind::Default => names,
                    ImportKind::Specified => format!("{{ {names} }}"),
                };
                Ok(format!("{indent}import {binding} from \"{resolved}\";"))
            }

            Statement::Export { declaration, .. } => self.visit_export(declaration),

            Statement::Guarded {
                statement,
                condition,
                ..
            } => {
                let condition = self.visit_expression(condition)?;
                let inner =
                    self.emit_scoped(std::slice::from_ref(statement.as_ref()), ScopeKind::Block, &[])?;
                let head = format!("if ({condition})");
                Ok(format!("{indent}{}", self.braced(&head, &inner)))
            }
        }
    }

    fn visit_class_member(&mut self, member: &ClassMember) -> CompileResult<String> {
        let indent = self.indent(self.indent_level);

        match member {
            ClassMember::Field { name, value, .. } => {
                let value = self.visit_expression(value)?;
                Ok(format!("{indent}{} = {value};", name.name))
            }
            ClassMember::Method {
                name, params, body, ..
            } => {
                let method_name = match name {
                    MethodName::Identifier(ident) if ident.name == CONSTRUCTOR_NAME => {
                        "constructor".to_string()
                    }
                    MethodName::Identifier(ident) => ident.name.clone(),
                    MethodName::Operator(op, _) => format!("\"{}\"", op.as_str()),
                };
                let inner = self.emit_scoped(&body.body, ScopeKind::Function, params)?;
                let head = format!("{method_name}({})", join_params(params));
                Ok(format!("{indent}{}", self.braced(&head, &inner)))
            }
        }
    }

    fn visit_export(&mut self, declaration: &Statement) -> CompileResult<String> {
        let indent = self.indent(self.indent_level);

        match declaration {
            Statement::FunctionDeclaration { .. } | Statement::ClassDeclaration { .. } => {
                let code = self.visit_statement(declaration)?;
                Ok(format!("{indent}export {}", code.trim_start()))
            }

            Statement::Expression {
                expression:
                    Expression::Assign {
                        target,
                        operator,
                        value,
                        span,
                        ..
                    },
                ..
            } => {
                let name = match target.as_ref() {
                    Expression::Variable { name, .. } => name,
                    other => {
                        return Err(transpiling_error(
                            "can't export this type of expression",
                            other.span(),
                        ))
                    }
                };

                if self.scopes.lookup(name).is_some() {
                    return Err(transpiling_error(
                        "can't export a variable after it has already been used",
                        *span,
                    ));
                }

                self.scopes.declare(name, SymbolKind::Variable, span.start);
                let value = self.assigned_value(name, *operator, value)?;
                Ok(format!("{indent}export let {name} = {value};"))
            }

            other => Err(transpiling_error(
                "can't export this type of expression",
                other.span(),
            )),
        }
    }

    /// Right side of an assignment, with compound operators lowered
    fn assigned_value(
        &mut self,
        target: &str,
        operator: AssignmentOperator,
        value: &Expression,
    ) -> CompileResult<String> {
        let value = self.visit_expression(value)?;
        Ok(match operator {
            AssignmentOperator::Assign => value,
            AssignmentOperator::Compound(op) => {
                format!("{OPERATOR_TABLE}[\"{}\"]({target}, {value})", op.as_str())
            }
        })
    }

    fn visit_expression(&mut self, expr: &Expression) -> CompileResult<String> {
        match expr {
            Expression::String { value, .. } => Ok(template_literal(value)),

            Expression::Number { value, .. } => Ok(value.clone()),

            Expression::Variable { name, .. } => Ok(name.clone()),

            Expression::Array { items, .. } => {
                self.indent_level += 1;
                let rendered: CompileResult<Vec<String>> =
                    items.iter().map(|item| self.visit_expression(item)).collect();
                self.indent_level -= 1;
                let rendered = rendered?;

                if rendered.is_empty() {
                    return Ok("[]".to_string());
                }

                let length: usize = rendered.iter().map(String::len).sum();
                if length <= INLINE_ARRAY_LIMIT {
                    return Ok(format!("[ {} ]", rendered.join(", ")));
                }

                let inner_indent = self.indent(self.indent_level + 1);
                let lines: Vec<String> = rendered
                    .iter()
                    .map(|item| format!("{inner_indent}{item}"))
                    .collect();
                Ok(format!(
                    "[\n{}\n{}]",
                    lines.join(",\n"),
                    self.indent(self.indent_level)
                ))
            }

            Expression::Object { fields, .. } => {
                self.indent_level += 1;
                let mut rendered = Vec::with_capacity(fields.len());
                for field in fields {
                    let value = self.visit_expression(&field.value);
                    match value {
                        Ok(value) => rendered.push(format!("{}: {value}", quote_key(&field.key))),
                        Err(err) => {
                            self.indent_level -= 1;
                            return Err(err);
                        }
                    }
                }
                self.indent_level -= 1;

                match rendered.len() {
                    0 => Ok("{}".to_string()),
                    1 => Ok(format!("{{ {} }}", rendered[0])),
                    _ => {
                        let inner_indent = self.indent(self.indent_level + 1);
                        let lines: Vec<String> = rendered
                            .iter()
                            .map(|field| format!("{inner_indent}{field}"))
                            .collect();
                        Ok(format!(
                            "{{\n{}\n{}}}",
                            lines.join(",\n"),
                            self.indent(self.indent_level)
                        ))
                    }
                }
            }

            Expression::PropertyAccess {
                object, property, ..
            } => {
                let object_code = self.visit_expression(object)?;
                if matches!(object.as_ref(), Expression::Number { .. }) {
                    Ok(format!("({object_code}).{}", property.name))
                } else {
                    Ok(format!("{object_code}.{}", property.name))
                }
            }

            Expression::Assign {
                target,
                operator,
                value,
                is_local,
                span,
            } => {
                if let Expression::Variable { name, .. } = target.as_ref() {
                    self.scopes.assign(name, span.start, *is_local);
                }
                let path = target
                    .assignable_path()
                    .ok_or_else(|| transpiling_error("invalid assignment target", target.span()))?;
                let value = self.assigned_value(&path, *operator, value)?;
                Ok(format!("{path} = {value}"))
            }

            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.visit_expression(left)?;
                let right = self.visit_expression(right)?;
                if *operator == BinaryOperator::Member {
                    Ok(format!("{left}[{right}]"))
                } else {
                    Ok(format!(
                        "{OPERATOR_TABLE}[\"{}\"]({left}, {right})",
                        operator.as_str()
                    ))
                }
            }

            Expression::Unary {
                operator, operand, ..
            } => {
                let operand = self.visit_expression(operand)?;
                Ok(format!(
                    "{OPERATOR_TABLE}[\"{}$\"]({operand})",
                    operator.as_str()
                ))
            }

            Expression::Lambda { params, body, .. } => {
                let inner = self.emit_scoped(&body.body, ScopeKind::Function, params)?;
                let head = format!("function({})", join_params(params));
                Ok(self.braced(&head, &inner))
            }

            Expression::Call {
                callee, arguments, ..
            } => {
                let callee_code = self.visit_expression(callee)?;
                let arguments = self.visit_arguments(arguments)?;
                if matches!(callee.as_ref(), Expression::Lambda { .. }) {
                    Ok(format!("({callee_code})({arguments})"))
                } else {
                    Ok(format!("{callee_code}({arguments})"))
                }
            }

            Expression::New {
                callee, arguments, ..
            } => {
                let callee_code = self.visit_expression(callee)?;
                let arguments = self.visit_arguments(arguments)?;
                if callee.is_assignable() {
                    Ok(format!("new {callee_code}({arguments})"))
                } else {
                    Ok(format!("new ({callee_code})({arguments})"))
                }
            }
        }
    }

    fn visit_arguments(&mut self, arguments: &[Expression]) -> CompileResult<String> {
        let mut rendered = Vec::with_capacity(arguments.len());
        for argument in arguments {
            rendered.push(self.visit_expression(argument)?);
        }
        Ok(rendered.join(", "))
    }

    /// Map an import's dotted path to the specifier written in the output
    fn resolve_import(&self, source: &[Identifier], span: Span) -> CompileResult<String> {
        let oracle = self.oracle.ok_or_else(|| {
            transpiling_error("cannot use import statement without a file oracle", span)
        })?;

        let joined = source
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join("/");
        let file = self.options.file_path.replace('\\', "/");
        let candidate = format!("{}.ka", join_paths(dirname(&file), &joined));
        let local = oracle.exists(&candidate);

        tracing::trace!(module = %joined, candidate = %candidate, local, "resolved import");

        if local {
            Ok(format!("./{joined}.js"))
        } else {
            Ok(joined)
        }
    }
}

fn join_params(params: &[Identifier]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Directory part of a `/`-separated path, empty when there is none
fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => "",
    }
}

/// Join two `/`-separated paths, keeping a leading `/` on the first
fn join_paths(base: &str, relative: &str) -> String {
    let trimmed_base = base.trim_end_matches('/');
    let relative = relative.trim_matches('/');
    if trimmed_base.is_empty() {
        if base.starts_with('/') {
            format!("/{relative}")
        } else {
            relative.to_string()
        }
    } else {
        format!("{trimmed_base}/{relative}")
    }
}

fn template_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('`');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('`');
    out
}

fn quote_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    out.push('"');
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Range helper and operator table emitted ahead of every program
fn runtime_preamble(indent: &str) -> String {
    let mut out = format!(
        "function {RANGE_HELPER}(start, end) {{\n\
         {indent}const out = [];\n\
         {indent}for (let i = start; i < end; i++) out.push(i);\n\
         {indent}return out;\n\
         }}\n\
         const {OPERATOR_TABLE} = {{\n"
    );

    for op in BinaryOperator::OVERLOADABLE {
        let key = op.as_str();
        let fallback = match op {
            BinaryOperator::Range => format!("{RANGE_HELPER}(a, b)"),
            BinaryOperator::Eq => "a === b".to_string(),
            BinaryOperator::NotEq => "a !== b".to_string(),
            _ => format!("a {key} b"),
        };
        out.push_str(&format!(
            "{indent}\"{key}\": (a, b) => a?.[\"{key}\"] ? a[\"{key}\"](b) : {fallback},\n"
        ));
    }

    for op in UnaryOperator::ALL {
        let key = op.as_str();
        out.push_str(&format!(
            "{indent}\"{key}$\": a => a?.[\"{key}\"] ? a[\"{key}\"]() : {key}a,\n"
        ));
    }

    out.push_str("};\n");
    out
}
