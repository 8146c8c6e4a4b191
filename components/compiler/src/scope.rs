//! Lexical scopes and the position-indexed scope resolver
//!
//! Scopes live in an arena ([`ScopeTree`]) and refer to their parent by
//! index. The same tree drives both the [`Resolver`], which keeps every
//! scope around for position lookups afterwards, and the
//! [`Transpiler`](crate::Transpiler), which reads the hoisted names of a scope
//! when it finishes emitting it.

use crate::ast::*;
use core_types::{SourcePosition, Span};
use std::collections::HashMap;

/// Index of a scope inside a [`ScopeTree`]
pub type ScopeId = usize;

/// What a symbol was introduced by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Assignment, parameter, loop variable or import
    Variable,
    /// Function declaration
    Function,
    /// Class declaration
    Class,
}

/// A named binding in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Bound name
    pub name: String,
    /// Binding kind
    pub kind: SymbolKind,
    /// Where the binding was first written
    pub defined_at: SourcePosition,
    /// Whether a `let` declaration must be emitted for it
    pub hoisted: bool,
}

/// Role of a scope in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Program, function, lambda or method body; receives implicit declarations
    Function,
    /// Class body; holds no declarations of its own
    Class,
    /// Control-flow body (if, else, for, while, guard)
    Block,
}

/// A single scope
#[derive(Debug, Clone)]
pub struct Scope {
    /// Scope ID
    pub id: ScopeId,
    /// Parent scope ID
    pub parent: Option<ScopeId>,
    /// Scope role
    pub kind: ScopeKind,
    symbols: Vec<Symbol>,
}

impl Scope {
    fn new(id: ScopeId, parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            id,
            parent,
            kind,
            symbols: Vec::new(),
        }
    }

    /// Symbol declared directly in this scope
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Symbols declared directly in this scope, in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Names that need a `let` declaration at the top of this scope
    pub fn hoisted_names(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .filter(|s| s.hoisted)
            .map(|s| s.name.as_str())
    }

    fn bind(&mut self, symbol: Symbol) {
        match self.symbols.iter_mut().find(|s| s.name == symbol.name) {
            Some(existing) => *existing = symbol,
            None => self.symbols.push(symbol),
        }
    }
}

/// Arena of scopes plus the unit-wide extern table
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
    externs: HashMap<String, ExternKind>,
}

impl ScopeTree {
    /// Create a tree holding only the program scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(0, None, ScopeKind::Function)],
            current: 0,
            externs: HashMap::new(),
        }
    }

    /// The scope currently being filled
    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Scope by ID
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Number of scopes created so far, the program scope included
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Open a child of the current scope and make it current
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(id, Some(self.current), kind));
        self.current = id;
        id
    }

    /// Return to the parent of the current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Find `name` starting at `from` and walking outwards
    pub fn lookup_from(&self, from: ScopeId, name: &str) -> Option<&Symbol> {
        let mut id = Some(from);
        while let Some(current) = id {
            let scope = &self.scopes[current];
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
            id = scope.parent;
        }
        None
    }

    /// Find `name` from the current scope outwards
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.lookup_from(self.current, name)
    }

    /// Every symbol visible from `id`, outermost scope first
    pub fn visible_symbols(&self, id: ScopeId) -> Vec<&Symbol> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(scope_id) = current {
            chain.push(scope_id);
            current = self.scopes[scope_id].parent;
        }

        chain
            .into_iter()
            .rev()
            .flat_map(|scope_id| self.scopes[scope_id].symbols.iter())
            .collect()
    }

    /// Record a host-provided name
    pub fn declare_extern(&mut self, name: &str, kind: ExternKind) {
        self.externs.insert(name.to_string(), kind);
    }

    /// How `name` was declared extern, if it was
    pub fn extern_kind(&self, name: &str) -> Option<ExternKind> {
        self.externs.get(name).copied()
    }

    /// Bind `name` in the current scope without asking for a declaration
    ///
    /// Used for parameters, imports, exports and function and class names,
    /// which the generated code declares by other means.
    pub fn declare(&mut self, name: &str, kind: SymbolKind, defined_at: SourcePosition) {
        self.scopes[self.current].bind(Symbol {
            name: name.to_string(),
            kind,
            defined_at,
            hoisted: false,
        });
    }

    /// Register an assignment to `name`
    ///
    /// A `local` assignment binds in the current scope, unless that scope
    /// already holds the name as a parameter, import or declaration, which
    /// JavaScript would reject a second `let` for. Otherwise the name is left
    /// alone when it is extern or already visible, and is declared in the
    /// nearest function-level scope when it is new.
    pub fn assign(&mut self, name: &str, defined_at: SourcePosition, is_local: bool) {
        let symbol = Symbol {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            defined_at,
            hoisted: true,
        };

        if is_local {
            let scope = &mut self.scopes[self.current];
            if !matches!(scope.get(name), Some(existing) if !existing.hoisted) {
                scope.bind(symbol);
            }
            return;
        }

        if self.externs.contains_key(name) || self.lookup(name).is_some() {
            return;
        }

        let target = self.nearest_function_scope();
        self.scopes[target].bind(symbol);
    }

    fn nearest_function_scope(&self) -> ScopeId {
        let mut id = self.current;
        loop {
            let scope = &self.scopes[id];
            match (scope.kind, scope.parent) {
                (ScopeKind::Function, _) | (_, None) => return id,
                (_, Some(parent)) => id = parent,
            }
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a program once and remembers which scope every node sits in
///
/// # Examples
///
/// ```
/// use ka_compiler::{parse_source, Resolver};
///
/// let program = parse_source("function f(a) do b = a end").unwrap();
/// let mut resolver = Resolver::new(&program);
/// resolver.run();
///
/// // offset 20 is inside the function body
/// let names: Vec<&str> = resolver
///     .symbols_at_offset(20)
///     .iter()
///     .map(|s| s.name.as_str())
///     .collect();
/// assert_eq!(names, vec!["f", "a", "b"]);
/// ```
pub struct Resolver<'a> {
    program: &'a Program,
    scopes: ScopeTree,
    history: Vec<(Span, ScopeId)>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for `program`
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            scopes: ScopeTree::new(),
            history: Vec::new(),
        }
    }

    /// Traverse the whole program, rebuilding all scope information
    pub fn run(&mut self) {
        self.scopes = ScopeTree::new();
        self.history.clear();

        let program = self.program;
        self.record(program.span);
        for stmt in &program.body {
            self.visit_statement(stmt);
        }

        tracing::debug!(
            scopes = self.scopes.scope_count(),
            entries = self.history.len(),
            "resolved scopes"
        );
    }

    /// The scope arena built by [`run`](Self::run)
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Innermost scope whose node covers the byte offset
    pub fn lookup_by_offset(&self, offset: usize) -> Option<&Scope> {
        self.history
            .iter()
            .rev()
            .find(|(span, _)| span.contains_offset(offset))
            .map(|(_, id)| self.scopes.scope(*id))
    }

    /// Innermost scope whose node covers the zero-based line and column
    pub fn lookup_by_line_column(&self, line: u32, column: u32) -> Option<&Scope> {
        self.history
            .iter()
            .rev()
            .find(|(span, _)| span.contains_line_column(line, column))
            .map(|(_, id)| self.scopes.scope(*id))
    }

    /// Every name visible at the byte offset, outermost first
    pub fn symbols_at_offset(&self, offset: usize) -> Vec<&Symbol> {
        match self.lookup_by_offset(offset) {
            Some(scope) => self.scopes.visible_symbols(scope.id),
            None => Vec::new(),
        }
    }

    fn record(&mut self, span: Span) {
        self.history.push((span, self.scopes.current()));
    }

    fn visit_block(&mut self, block: &Block, kind: ScopeKind, params: &[Identifier]) {
        self.scopes.enter_scope(kind);
        self.record(block.span);
        for param in params {
            self.record(param.span);
            self.scopes
                .declare(&param.name, SymbolKind::Variable, param.span.start);
        }
        for stmt in &block.body {
            self.visit_statement(stmt);
        }
        self.scopes.exit_scope();
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        self.record(stmt.span());

        match stmt {
            Statement::Expression { expression, .. } => self.visit_expression(expression),

            Statement::Block(block) => self.visit_block(block, ScopeKind::Block, &[]),

            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expression(condition);
                self.visit_block(then_branch, ScopeKind::Block, &[]);
                if let Some(else_branch) = else_branch {
                    self.visit_statement(else_branch);
                }
            }

            Statement::For {
                variable,
                iterable,
                body,
                span,
            } => {
                self.scopes.assign(&variable.name, span.start, false);
                self.visit_expression(iterable);
                self.visit_block(body, ScopeKind::Block, &[]);
            }

            Statement::While {
                condition, body, ..
            } => {
                self.visit_expression(condition);
                self.visit_block(body, ScopeKind::Block, &[]);
            }

            Statement::Return { argument, .. } => {
                if let Some(argument) = argument {
                    self.visit_expression(argument);
                }
            }

            Statement::Break { .. } | Statement::Continue { .. } => {}

            Statement::FunctionDeclaration {
                name,
                params,
                body,
                span,
            } => {
                self.scopes
                    .declare(&name.name, SymbolKind::Function, span.start);
                self.visit_block(body, ScopeKind::Function, params);
            }

            Statement::ClassDeclaration {
                name,
                members,
                span,
            } => {
                self.scopes.declare(&name.name, SymbolKind::Class, span.start);
                self.scopes.enter_scope(ScopeKind::Class);
                for member in members {
                    self.record(member.span());
                    match member {
                        ClassMember::Field { value, .. } => self.visit_expression(value),
                        ClassMember::Method { params, body, .. } => {
                            self.visit_block(body, ScopeKind::Function, params)
                        }
                    }
                }
                self.scopes.exit_scope();
            }

            Statement::ExternDeclaration { name, kind, .. } => {
                self.scopes.declare_extern(&name.name, *kind);
            }

            Statement::Import { names, .. } => {
                for name in names {
                    self.record(name.span);
                    self.scopes
                        .declare(&name.name, SymbolKind::Variable, name.span.start);
                }
            }

            Statement::Export { declaration, .. } => match declaration.as_ref() {
                Statement::Expression {
                    expression:
                        Expression::Assign {
                            target, value, span, ..
                        },
                    ..
                } => {
                    if let Expression::Variable { name, .. } = target.as_ref() {
                        if self.scopes.lookup(name).is_none() {
                            self.scopes.declare(name, SymbolKind::Variable, span.start);
                        }
                    }
                    self.record(*span);
                    self.visit_expression(target);
                    self.visit_expression(value);
                }
                other => self.visit_statement(other),
            },

            Statement::Guarded {
                statement,
                condition,
                ..
            } => {
                self.visit_expression(condition);
                self.scopes.enter_scope(ScopeKind::Block);
                self.visit_statement(statement);
                self.scopes.exit_scope();
            }
        }
    }

    fn visit_expression(&mut self, expr: &Expression) {
        self.record(expr.span());

        match expr {
            Expression::String { .. } | Expression::Number { .. } | Expression::Variable { .. } => {}

            Expression::Array { items, .. } => {
                for item in items {
                    self.visit_expression(item);
                }
            }

            Expression::Object { fields, .. } => {
                for field in fields {
                    self.visit_expression(&field.value);
                }
            }

            Expression::PropertyAccess { object, .. } => self.visit_expression(object),

            Expression::Assign {
                target,
                value,
                is_local,
                span,
                ..
            } => {
                if let Expression::Variable { name, .. } = target.as_ref() {
                    self.scopes.assign(name, span.start, *is_local);
                }
                self.visit_expression(target);
                self.visit_expression(value);
            }

            Expression::Binary { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }

            Expression::Unary { operand, .. } => self.visit_expression(operand),

            Expression::Lambda { params, body, .. } => {
                self.visit_block(body, ScopeKind::Function, params)
            }

            Expression::Call {
                callee, arguments, ..
            }
            | Expression::New {
                callee, arguments, ..
            } => {
                self.visit_expression(callee);
                for argument in arguments {
                    self.visit_expression(argument);
                }
            }
        }
    }
}
