//! Abstract Syntax Tree node definitions
//!
//! The tree is built once by the [`Parser`](crate::Parser) and then only
//! read by the [`Resolver`](crate::Resolver) and the
//! [`Transpiler`](crate::Transpiler). Every node carries the inclusive
//! [`Span`] of the text it was built from.

use core_types::Span;

/// Complete compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements
    pub body: Vec<Statement>,
    /// Source location
    pub span: Span,
}

/// A name together with where it was written
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The identifier text
    pub name: String,
    /// Source location
    pub span: Span,
}

/// Statement list that opens its own scope
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Statements in order
    pub body: Vec<Statement>,
    /// Source location, from the opening keyword to the closing one
    pub span: Span,
}

/// KaLang statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression evaluated for its effect
    Expression {
        /// The expression
        expression: Expression,
        /// Source location
        span: Span,
    },

    /// Bare block (only produced as an `else` branch)
    Block(Block),

    /// `if c then ... else ... end`
    If {
        /// Condition
        condition: Expression,
        /// Taken when the condition holds
        then_branch: Block,
        /// Either a [`Statement::Block`] or a chained [`Statement::If`]
        else_branch: Option<Box<Statement>>,
        /// Source location
        span: Span,
    },

    /// `for x in xs do ... end`
    For {
        /// Loop variable
        variable: Identifier,
        /// Iterated value
        iterable: Expression,
        /// Loop body
        body: Block,
        /// Source location
        span: Span,
    },

    /// `while c do ... end`
    While {
        /// Loop condition
        condition: Expression,
        /// Loop body
        body: Block,
        /// Source location
        span: Span,
    },

    /// `return` with optional value
    Return {
        /// Returned value
        argument: Option<Expression>,
        /// Source location
        span: Span,
    },

    /// `break`
    Break {
        /// Source location
        span: Span,
    },

    /// `continue`
    Continue {
        /// Source location
        span: Span,
    },

    /// `function name(a, b) do ... end`
    FunctionDeclaration {
        /// Function name
        name: Identifier,
        /// Parameter names
        params: Vec<Identifier>,
        /// Function body
        body: Block,
        /// Source location
        span: Span,
    },

    /// `class Name do ... end`
    ClassDeclaration {
        /// Class name
        name: Identifier,
        /// Fields and methods in source order
        members: Vec<ClassMember>,
        /// Source location
        span: Span,
    },

    /// `extern name` or `extern class Name`
    ExternDeclaration {
        /// Host-provided name
        name: Identifier,
        /// What the host provides
        kind: ExternKind,
        /// Source location
        span: Span,
    },

    /// `import a.b` or `from a.b import x, y`
    Import {
        /// Dotted module path segments
        source: Vec<Identifier>,
        /// Names bound by the import
        names: Vec<Identifier>,
        /// How the names are bound
        kind: ImportKind,
        /// Source location
        span: Span,
    },

    /// `export <declaration>`
    Export {
        /// Exported declaration or assignment
        declaration: Box<Statement>,
        /// Source location
        span: Span,
    },

    /// `statement if condition`, on a single line
    Guarded {
        /// Statement run only when the condition holds
        statement: Box<Statement>,
        /// Guard condition
        condition: Expression,
        /// Source location
        span: Span,
    },
}

impl Statement {
    /// Source location of the statement
    pub fn span(&self) -> Span {
        match self {
            Statement::Block(block) => block.span,
            Statement::Expression { span, .. }
            | Statement::If { span, .. }
            | Statement::For { span, .. }
            | Statement::While { span, .. }
            | Statement::Return { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::FunctionDeclaration { span, .. }
            | Statement::ClassDeclaration { span, .. }
            | Statement::ExternDeclaration { span, .. }
            | Statement::Import { span, .. }
            | Statement::Export { span, .. }
            | Statement::Guarded { span, .. } => *span,
        }
    }
}

/// Member of a class body
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// `name = value`
    Field {
        /// Field name
        name: Identifier,
        /// Initial value
        value: Expression,
        /// Source location
        span: Span,
    },

    /// `name(a, b) do ... end`
    Method {
        /// Method name; `__init__` is the constructor
        name: MethodName,
        /// Parameter names
        params: Vec<Identifier>,
        /// Method body
        body: Block,
        /// Source location
        span: Span,
    },
}

impl ClassMember {
    /// Source location of the member
    pub fn span(&self) -> Span {
        match self {
            ClassMember::Field { span, .. } | ClassMember::Method { span, .. } => *span,
        }
    }
}

/// Name of a class method
#[derive(Debug, Clone, PartialEq)]
pub enum MethodName {
    /// Ordinary method name
    Identifier(Identifier),
    /// Operator overload such as `+` or `..`
    Operator(BinaryOperator, Span),
}

/// Constructor sentinel recognised in class bodies
pub const CONSTRUCTOR_NAME: &str = "__init__";

/// What an `extern` declaration provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternKind {
    /// `extern name`
    Variable,
    /// `extern class Name`
    Class,
}

/// How an import binds its names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a.b` binds the whole module as `b`
    Module,
    /// `from a import default x`
    Default,
    /// `from a import x, y`
    Specified,
}

/// KaLang expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// String literal (unescaped contents)
    String {
        /// Literal value
        value: String,
        /// Source location
        span: Span,
    },

    /// Number literal, kept as written
    Number {
        /// Literal text
        value: String,
        /// Source location
        span: Span,
    },

    /// `[a, b]`
    Array {
        /// Items in order
        items: Vec<Expression>,
        /// Source location
        span: Span,
    },

    /// `{ key: value }`
    Object {
        /// Fields in source order
        fields: Vec<ObjectField>,
        /// Source location
        span: Span,
    },

    /// Reference to a name
    Variable {
        /// Variable name
        name: String,
        /// Source location
        span: Span,
    },

    /// `object.property`
    PropertyAccess {
        /// Accessed value
        object: Box<Expression>,
        /// Property name
        property: Identifier,
        /// Source location
        span: Span,
    },

    /// `target = value`, `target += value`, `local target = value`
    Assign {
        /// Identifier or dotted identifier chain
        target: Box<Expression>,
        /// Assignment operator
        operator: AssignmentOperator,
        /// Assigned value
        value: Box<Expression>,
        /// Whether the assignment was written with `local`
        is_local: bool,
        /// Source location
        span: Span,
    },

    /// Binary operator application; `.` here is computed member access
    Binary {
        /// Left operand
        left: Box<Expression>,
        /// Operator
        operator: BinaryOperator,
        /// Right operand
        right: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Prefix sign or negation
    Unary {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        operand: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// `with a, b do ... end` or `do ... end`
    Lambda {
        /// Parameter names
        params: Vec<Identifier>,
        /// Function body
        body: Block,
        /// Source location
        span: Span,
    },

    /// `callee(args)`
    Call {
        /// Called value
        callee: Box<Expression>,
        /// Arguments
        arguments: Vec<Expression>,
        /// Source location
        span: Span,
    },

    /// `new Callee(args)`
    New {
        /// Constructed value
        callee: Box<Expression>,
        /// Constructor arguments
        arguments: Vec<Expression>,
        /// Source location
        span: Span,
    },
}

impl Expression {
    /// Source location of the expression
    pub fn span(&self) -> Span {
        match self {
            Expression::String { span, .. }
            | Expression::Number { span, .. }
            | Expression::Array { span, .. }
            | Expression::Object { span, .. }
            | Expression::Variable { span, .. }
            | Expression::PropertyAccess { span, .. }
            | Expression::Assign { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Lambda { span, .. }
            | Expression::Call { span, .. }
            | Expression::New { span, .. } => *span,
        }
    }

    /// Whether the expression may appear on the left of `=`: a bare
    /// identifier or identifiers joined only by `.`
    pub fn is_assignable(&self) -> bool {
        match self {
            Expression::Variable { .. } => true,
            Expression::PropertyAccess { object, .. } => object.is_assignable(),
            _ => false,
        }
    }

    /// Dotted source text of an assignable expression (`a.b.c`)
    pub fn assignable_path(&self) -> Option<String> {
        match self {
            Expression::Variable { name, .. } => Some(name.clone()),
            Expression::PropertyAccess {
                object, property, ..
            } => object
                .assignable_path()
                .map(|base| format!("{}.{}", base, property.name)),
            _ => None,
        }
    }
}

/// Object literal field
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    /// Field key
    pub key: String,
    /// Field value
    pub value: Expression,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
    /// %
    Mod,
    /// ==
    Eq,
    /// !=
    NotEq,
    /// <=
    LtEq,
    /// >=
    GtEq,
    /// <
    Lt,
    /// >
    Gt,
    /// && (also `and`)
    And,
    /// || (also `or`)
    Or,
    /// ..
    Range,
    /// `.` with a non-identifier right side
    Member,
}

impl BinaryOperator {
    /// Every operator routed through the runtime dispatch table, in table order
    pub const OVERLOADABLE: [BinaryOperator; 14] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::Mod,
        BinaryOperator::Eq,
        BinaryOperator::NotEq,
        BinaryOperator::LtEq,
        BinaryOperator::GtEq,
        BinaryOperator::Lt,
        BinaryOperator::Gt,
        BinaryOperator::And,
        BinaryOperator::Or,
        BinaryOperator::Range,
    ];

    /// Map normalized operator token text to an operator
    pub fn from_token_text(text: &str) -> Option<Self> {
        let op = match text {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::NotEq,
            "<=" => BinaryOperator::LtEq,
            ">=" => BinaryOperator::GtEq,
            "<" => BinaryOperator::Lt,
            ">" => BinaryOperator::Gt,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            ".." => BinaryOperator::Range,
            "." => BinaryOperator::Member,
            _ => return None,
        };
        Some(op)
    }

    /// KaLang spelling, also the dispatch table key
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Range => "..",
            BinaryOperator::Member => ".",
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -x
    Minus,
    /// +x
    Plus,
    /// !x (also `not x`)
    Not,
}

impl UnaryOperator {
    /// Every unary operator, in dispatch table order
    pub const ALL: [UnaryOperator; 3] = [UnaryOperator::Minus, UnaryOperator::Plus, UnaryOperator::Not];

    /// Map normalized operator token text to an operator
    pub fn from_token_text(text: &str) -> Option<Self> {
        match text {
            "-" => Some(UnaryOperator::Minus),
            "+" => Some(UnaryOperator::Plus),
            "!" => Some(UnaryOperator::Not),
            _ => None,
        }
    }

    /// Operator spelling
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// =
    Assign,
    /// `op=`, lowered to `target = op(target, value)`
    Compound(BinaryOperator),
}
