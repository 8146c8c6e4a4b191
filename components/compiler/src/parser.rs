//! Recursive descent parser for KaLang
//!
//! Statements are dispatched on their leading keyword. Expressions use
//! precedence climbing, with calls (`fn`) and member access (`.`) folded into
//! the same loop as pseudo-operators so that `a.b(c).d` needs no separate
//! postfix handling.

use crate::ast::*;
use crate::error::*;
use crate::lexer::{Keyword, Token, TokenKind};
use core_types::{CompileResult, SourcePosition, Span};

/// Binding strength of calls
const CALL_PRECEDENCE: u8 = 6;

/// Binding strength of member access
const MEMBER_PRECEDENCE: u8 = 7;

/// Precedence of a binary operator token, `None` if it cannot be infix
fn binary_precedence(text: &str) -> Option<u8> {
    match text {
        "+" | "-" => Some(1),
        "*" | "/" | "%" => Some(2),
        "==" | "!=" | "<=" | ">=" | "<" | ">" => Some(3),
        "&&" | "||" => Some(4),
        ".." => Some(5),
        "." => Some(MEMBER_PRECEDENCE),
        _ => None,
    }
}

/// KaLang parser over a materialized token list
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser over the output of [`Lexer::lex_all`](crate::Lexer::lex_all)
    ///
    /// A missing end-of-input token is appended so the parser never runs
    /// past the end of the list.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span::at(t.span.end))
                .unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token list into a program
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut body = Vec::new();
        let mut end = self.current().span.end;

        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        if let Some(last) = body.last() {
            end = last.span().end;
        }

        tracing::debug!(statements = body.len(), "parsed program");

        Ok(Program {
            body,
            span: Span::new(SourcePosition::default(), end),
        })
    }

    // ---------------------------------------------------------------------
    // Token helpers
    // ---------------------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_value(&self, kind: TokenKind, value: &str) -> bool {
        let token = self.current();
        token.kind == kind && token.text == value
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn check_delimiter(&self, value: &str) -> bool {
        self.check_value(TokenKind::Delimiter, value)
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(unexpected_token(self.current(), kind, None))
        }
    }

    fn expect_value(&mut self, kind: TokenKind, value: &str) -> CompileResult<Token> {
        if self.check_value(kind, value) {
            Ok(self.advance())
        } else {
            Err(unexpected_token(self.current(), kind, Some(value)))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<Token> {
        self.expect_value(TokenKind::Keyword, keyword.as_str())
    }

    fn expect_delimiter(&mut self, value: &str) -> CompileResult<Token> {
        self.expect_value(TokenKind::Delimiter, value)
    }

    fn expect_identifier(&mut self) -> CompileResult<Identifier> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Identifier {
            name: token.text,
            span: token.span,
        })
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn parse_statement(&mut self) -> CompileResult<Statement> {
        let statement = self.parse_simple_statement()?;

        if self.check_keyword(Keyword::If)
            && self.current().span.start.line == statement.span().end.line
        {
            self.advance();
            let condition = self.parse_expression()?;
            let span = statement.span().to(condition.span());
            return Ok(Statement::Guarded {
                statement: Box::new(statement),
                condition,
                span,
            });
        }

        Ok(statement)
    }

    fn parse_simple_statement(&mut self) -> CompileResult<Statement> {
        let keyword = match self.current().kind {
            TokenKind::Keyword => Keyword::from_lexeme(&self.current().text),
            _ => None,
        };

        match keyword {
            Some(Keyword::If) => self.parse_if_statement(),
            Some(Keyword::For) => self.parse_for_statement(),
            Some(Keyword::While) => self.parse_while_statement(),
            Some(Keyword::Function) => self.parse_function_declaration(),
            Some(Keyword::Class) => self.parse_class_declaration(),
            Some(Keyword::Return) => self.parse_return_statement(),
            Some(Keyword::Break) => Ok(Statement::Break {
                span: self.advance().span,
            }),
            Some(Keyword::Continue) => Ok(Statement::Continue {
                span: self.advance().span,
            }),
            Some(Keyword::Extern) => self.parse_extern_declaration(),
            Some(Keyword::Local) => self.parse_local_statement(),
            Some(Keyword::Import) => self.parse_import_statement(),
            Some(Keyword::From) => self.parse_from_import_statement(),
            Some(Keyword::Export) => self.parse_export_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> CompileResult<Statement> {
        let expression = self.parse_expression()?;
        let span = expression.span();
        Ok(Statement::Expression { expression, span })
    }

    /// Statements up to (not including) one of `terminators` or end of input
    fn parse_statements_until(&mut self, terminators: &[Keyword]) -> CompileResult<Vec<Statement>> {
        let mut body = Vec::new();
        while !self.is_at_end() && !terminators.iter().any(|k| self.check_keyword(*k)) {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    /// `do statement* end`, with the span running from `do` to `end`
    fn parse_do_block(&mut self) -> CompileResult<Block> {
        let start = self.expect_keyword(Keyword::Do)?.span;
        let body = self.parse_statements_until(&[Keyword::End])?;
        let end = self.expect_keyword(Keyword::End)?.span;
        Ok(Block {
            body,
            span: start.to(end),
        })
    }

    fn parse_if_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::If)?.span;
        let condition = self.parse_expression()?;
        let then_token = self.expect_keyword(Keyword::Then)?.span;
        let then_body = self.parse_statements_until(&[Keyword::End, Keyword::Else])?;
        let then_branch = Block {
            body: then_body,
            span: then_token.to(self.previous_span()),
        };

        if self.check_keyword(Keyword::End) {
            let end = self.advance().span;
            return Ok(Statement::If {
                condition,
                then_branch,
                else_branch: None,
                span: start.to(end),
            });
        }

        let else_token = self.expect_keyword(Keyword::Else)?.span;
        let else_branch = if self.check_keyword(Keyword::If) {
            self.parse_if_statement()?
        } else {
            let body = self.parse_statements_until(&[Keyword::End])?;
            let end = self.expect_keyword(Keyword::End)?.span;
            Statement::Block(Block {
                body,
                span: else_token.to(end),
            })
        };

        let span = start.to(else_branch.span());
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch: Some(Box::new(else_branch)),
            span,
        })
    }

    fn parse_for_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::For)?.span;
        let variable = self.expect_identifier()?;
        self.expect_keyword(Keyword::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_do_block()?;
        let span = start.to(body.span);
        Ok(Statement::For {
            variable,
            iterable,
            body,
            span,
        })
    }

    fn parse_while_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::While)?.span;
        let condition = self.parse_expression()?;
        let body = self.parse_do_block()?;
        let span = start.to(body.span);
        Ok(Statement::While {
            condition,
            body,
            span,
        })
    }

    /// `( a, b )` or nothing
    fn parse_parameters(&mut self) -> CompileResult<Vec<Identifier>> {
        self.expect_delimiter("(")?;
        let mut params = Vec::new();
        while !self.check_delimiter(")") {
            if !params.is_empty() {
                self.expect_delimiter(",")?;
            }
            params.push(self.expect_identifier()?);
        }
        self.expect_delimiter(")")?;
        Ok(params)
    }

    fn parse_function_declaration(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::Function)?.span;
        let name = self.expect_identifier()?;
        let params = if self.check_delimiter("(") {
            self.parse_parameters()?
        } else {
            Vec::new()
        };
        let body = self.parse_do_block()?;
        let span = start.to(body.span);
        Ok(Statement::FunctionDeclaration {
            name,
            params,
            body,
            span,
        })
    }

    fn parse_class_declaration(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::Class)?.span;
        let name = self.expect_identifier()?;
        self.expect_keyword(Keyword::Do)?;

        let mut members = Vec::new();
        while !self.is_at_end() && !self.check_keyword(Keyword::End) {
            members.push(self.parse_class_member()?);
        }

        let end = self.expect_keyword(Keyword::End)?.span;
        Ok(Statement::ClassDeclaration {
            name,
            members,
            span: start.to(end),
        })
    }

    fn parse_class_member(&mut self) -> CompileResult<ClassMember> {
        let is_field = self.check(TokenKind::Identifier)
            && self.peek_next().map(|t| t.kind) == Some(TokenKind::Equals);

        if is_field {
            let name = self.expect_identifier()?;
            self.expect(TokenKind::Equals)?;
            let value = self.parse_expression()?;
            let span = name.span.to(value.span());
            return Ok(ClassMember::Field { name, value, span });
        }

        let name = if self.check(TokenKind::Operator) {
            let token = self.current();
            match BinaryOperator::from_token_text(&token.text) {
                Some(op) if op != BinaryOperator::Member => {
                    let span = self.advance().span;
                    MethodName::Operator(op, span)
                }
                _ => return Err(unexpected_token(token, TokenKind::Identifier, None)),
            }
        } else {
            MethodName::Identifier(self.expect_identifier()?)
        };
        let start = match &name {
            MethodName::Identifier(ident) => ident.span,
            MethodName::Operator(_, span) => *span,
        };

        let params = self.parse_parameters()?;
        let body = self.parse_do_block()?;
        let span = start.to(body.span);
        Ok(ClassMember::Method {
            name,
            params,
            body,
            span,
        })
    }

    fn parse_return_statement(&mut self) -> CompileResult<Statement> {
        let keyword = self.expect_keyword(Keyword::Return)?.span;
        let next = self.current();
        let has_value = next.kind != TokenKind::Eof
            && next.span.start.line == keyword.end.line
            && !next.is_keyword(Keyword::End)
            && !next.is_keyword(Keyword::Else)
            && !next.is_keyword(Keyword::If);

        let argument = if has_value {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let span = match &argument {
            Some(value) => keyword.to(value.span()),
            None => keyword,
        };
        Ok(Statement::Return { argument, span })
    }

    fn parse_extern_declaration(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::Extern)?.span;
        let kind = if self.check_keyword(Keyword::Class) {
            self.advance();
            ExternKind::Class
        } else {
            ExternKind::Variable
        };
        let name = self.expect_identifier()?;
        let span = start.to(name.span);
        Ok(Statement::ExternDeclaration { name, kind, span })
    }

    fn parse_local_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::Local)?.span;
        let expression = self.parse_expression()?;

        match expression {
            Expression::Assign {
                target,
                operator,
                value,
                ..
            } => {
                let span = start.to(value.span());
                Ok(Statement::Expression {
                    expression: Expression::Assign {
                        target,
                        operator,
                        value,
                        is_local: true,
                        span,
                    },
                    span,
                })
            }
            other => Err(parsing_error(
                "expected variable assignment after keyword local",
                other.span(),
            )),
        }
    }

    /// `IDENT ('.' IDENT)*`
    fn parse_module_path(&mut self) -> CompileResult<Vec<Identifier>> {
        let mut segments = vec![self.expect_identifier()?];
        while self.check_value(TokenKind::Operator, ".") {
            self.advance();
            segments.push(self.expect_identifier()?);
        }
        Ok(segments)
    }

    fn parse_import_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::Import)?.span;
        let source = self.parse_module_path()?;
        let last = source[source.len() - 1].clone();
        let span = start.to(last.span);
        Ok(Statement::Import {
            source,
            names: vec![last],
            kind: ImportKind::Module,
            span,
        })
    }

    fn parse_from_import_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::From)?.span;
        let source = self.parse_module_path()?;
        self.expect_keyword(Keyword::Import)?;

        let (kind, names) = if self.check_keyword(Keyword::Default) {
            self.advance();
            (ImportKind::Default, vec![self.expect_identifier()?])
        } else {
            let mut names = vec![self.expect_identifier()?];
            while self.check_delimiter(",") {
                self.advance();
                names.push(self.expect_identifier()?);
            }
            (ImportKind::Specified, names)
        };

        let span = start.to(self.previous_span());
        Ok(Statement::Import {
            source,
            names,
            kind,
            span,
        })
    }

    fn parse_export_statement(&mut self) -> CompileResult<Statement> {
        let start = self.expect_keyword(Keyword::Export)?.span;
        let declaration = if self.check_keyword(Keyword::Function) {
            self.parse_function_declaration()?
        } else if self.check_keyword(Keyword::Class) {
            self.parse_class_declaration()?
        } else if self.check_keyword(Keyword::Local) {
            self.parse_local_statement()?
        } else {
            self.parse_expression_statement()?
        };
        let span = start.to(declaration.span());
        Ok(Statement::Export {
            declaration: Box::new(declaration),
            span,
        })
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    /// Full expression, reinterpreted as an assignment when an `=` or
    /// compound operator follows an assignable left side
    fn parse_expression(&mut self) -> CompileResult<Expression> {
        let primary = self.parse_primary()?;
        let expression = self.parse_expression_inner(primary, 0)?;

        let is_assignment = self.check(TokenKind::Equals) || self.check(TokenKind::CompoundAssign);
        if !is_assignment || !expression.is_assignable() {
            return Ok(expression);
        }

        let operator_token = self.advance();
        let operator = if operator_token.kind == TokenKind::Equals {
            AssignmentOperator::Assign
        } else {
            let text = operator_token.text.trim_end_matches('=');
            match BinaryOperator::from_token_text(text) {
                Some(op) => AssignmentOperator::Compound(op),
                None => {
                    return Err(unexpected_token(&operator_token, TokenKind::Equals, None));
                }
            }
        };

        let value = self.parse_expression()?;
        let span = expression.span().to(value.span());
        Ok(Expression::Assign {
            target: Box::new(expression),
            operator,
            value: Box::new(value),
            is_local: false,
            span,
        })
    }

    /// Precedence of the current token when it can continue an expression
    fn current_precedence(&self) -> Option<u8> {
        let token = self.current();
        match token.kind {
            TokenKind::Operator => binary_precedence(&token.text),
            TokenKind::Delimiter if token.text == "(" => Some(CALL_PRECEDENCE),
            _ => None,
        }
    }

    fn parse_expression_inner(
        &mut self,
        mut lhs: Expression,
        min_precedence: u8,
    ) -> CompileResult<Expression> {
        while let Some(precedence) = self.current_precedence().filter(|p| *p >= min_precedence) {
            if self.check_delimiter("(") {
                lhs = self.parse_call(lhs)?;
                continue;
            }

            let operator = self.advance();
            let parenthesized = self.check_delimiter("(");
            let mut rhs = self.parse_primary()?;
            while self.current_precedence().is_some_and(|p| p > precedence) {
                rhs = self.parse_expression_inner(rhs, precedence + 1)?;
            }
            lhs = Self::make_binary(lhs, &operator, rhs, parenthesized)?;
        }
        Ok(lhs)
    }

    /// Fold `lhs op rhs`; `a.b` becomes a property access unless the right
    /// side was written in parentheses
    fn make_binary(
        lhs: Expression,
        operator: &Token,
        rhs: Expression,
        parenthesized: bool,
    ) -> CompileResult<Expression> {
        let op = BinaryOperator::from_token_text(&operator.text)
            .ok_or_else(|| unexpected_token(operator, TokenKind::Operator, None))?;
        let span = lhs.span().to(rhs.span());

        if op == BinaryOperator::Member && !parenthesized {
            if let Expression::Variable { name, span: name_span } = rhs {
                return Ok(Expression::PropertyAccess {
                    object: Box::new(lhs),
                    property: Identifier {
                        name,
                        span: name_span,
                    },
                    span,
                });
            }
        }

        Ok(Expression::Binary {
            left: Box::new(lhs),
            operator: op,
            right: Box::new(rhs),
            span,
        })
    }

    fn parse_arguments(&mut self) -> CompileResult<(Vec<Expression>, Span)> {
        self.expect_delimiter("(")?;
        let mut arguments = Vec::new();
        while !self.check_delimiter(")") {
            if !arguments.is_empty() {
                self.expect_delimiter(",")?;
            }
            arguments.push(self.parse_expression()?);
        }
        let end = self.expect_delimiter(")")?.span;
        Ok((arguments, end))
    }

    fn parse_call(&mut self, callee: Expression) -> CompileResult<Expression> {
        let (arguments, end) = self.parse_arguments()?;
        let span = callee.span().to(end);
        Ok(Expression::Call {
            callee: Box::new(callee),
            arguments,
            span,
        })
    }

    fn parse_primary(&mut self) -> CompileResult<Expression> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::String => {
                self.advance();
                Ok(Expression::String {
                    value: token.text,
                    span: token.span,
                })
            }
            TokenKind::Number => {
                self.advance();
                Ok(Expression::Number {
                    value: token.text,
                    span: token.span,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expression::Variable {
                    name: token.text,
                    span: token.span,
                })
            }
            TokenKind::Operator => match UnaryOperator::from_token_text(&token.text) {
                Some(operator) => self.parse_unary(operator),
                None => Err(expected_expression(&token)),
            },
            TokenKind::Delimiter if token.text == "(" => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_delimiter(")")?;
                Ok(inner)
            }
            TokenKind::Delimiter if token.text == "[" => self.parse_array(),
            TokenKind::Delimiter if token.text == "{" => self.parse_object(),
            TokenKind::Keyword if token.is_keyword(Keyword::Do) || token.is_keyword(Keyword::With) => {
                self.parse_lambda()
            }
            TokenKind::Keyword if token.is_keyword(Keyword::New) => self.parse_new(),
            _ => Err(expected_expression(&token)),
        }
    }

    /// Sign or negation; binds looser than calls and member access
    fn parse_unary(&mut self, operator: UnaryOperator) -> CompileResult<Expression> {
        let start = self.advance().span;
        let primary = self.parse_primary()?;
        let operand = self.parse_expression_inner(primary, CALL_PRECEDENCE)?;
        let span = start.to(operand.span());
        Ok(Expression::Unary {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_array(&mut self) -> CompileResult<Expression> {
        let start = self.expect_delimiter("[")?.span;
        let mut items = Vec::new();
        while !self.check_delimiter("]") {
            if !items.is_empty() {
                self.expect_delimiter(",")?;
            }
            items.push(self.parse_expression()?);
        }
        let end = self.expect_delimiter("]")?.span;
        Ok(Expression::Array {
            items,
            span: start.to(end),
        })
    }

    fn parse_object(&mut self) -> CompileResult<Expression> {
        let start = self.expect_delimiter("{")?.span;
        let mut fields: Vec<ObjectField> = Vec::new();
        while !self.check_delimiter("}") {
            if !fields.is_empty() {
                self.expect_delimiter(",")?;
            }
            let key = if self.check(TokenKind::String) {
                self.advance().text
            } else {
                self.expect(TokenKind::Identifier)?.text
            };
            self.expect_delimiter(":")?;
            let value = self.parse_expression()?;

            // Later duplicates overwrite earlier ones in place.
            match fields.iter_mut().find(|f| f.key == key) {
                Some(existing) => existing.value = value,
                None => fields.push(ObjectField { key, value }),
            }
        }
        let end = self.expect_delimiter("}")?.span;
        Ok(Expression::Object {
            fields,
            span: start.to(end),
        })
    }

    fn parse_lambda(&mut self) -> CompileResult<Expression> {
        let start = self.current().span;
        let mut params = Vec::new();

        if self.check_keyword(Keyword::With) {
            self.advance();
            loop {
                if !params.is_empty() {
                    self.expect_delimiter(",")?;
                }
                params.push(self.expect_identifier()?);
                if self.check_keyword(Keyword::Do) {
                    break;
                }
            }
        }

        let body = self.parse_do_block()?;
        let span = start.to(body.span);
        Ok(Expression::Lambda { params, body, span })
    }

    /// `new Callee(args)`, where the callee may be a dotted path
    fn parse_new(&mut self) -> CompileResult<Expression> {
        let start = self.expect_keyword(Keyword::New)?.span;
        let mut callee = self.parse_primary()?;

        while self.check_value(TokenKind::Operator, ".") {
            let dot = self.advance();
            let parenthesized = self.check_delimiter("(");
            let property = self.parse_primary()?;
            callee = Self::make_binary(callee, &dot, property, parenthesized)?;
        }

        let (arguments, end) = self.parse_arguments()?;
        Ok(Expression::New {
            callee: Box::new(callee),
            arguments,
            span: start.to(end),
        })
    }
}
