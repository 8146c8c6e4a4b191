//! KaLang Lexer - tokenizes source code into tokens

use crate::error::lexing_error;
use core_types::{CompileError, SourcePosition, Span};
use std::fmt;

/// KaLang reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// with keyword (lambda parameters)
    With,
    /// do keyword
    Do,
    /// end keyword
    End,
    /// if keyword
    If,
    /// else keyword
    Else,
    /// then keyword
    Then,
    /// for keyword
    For,
    /// in keyword
    In,
    /// function keyword
    Function,
    /// while keyword
    While,
    /// return keyword
    Return,
    /// class keyword
    Class,
    /// extern keyword
    Extern,
    /// local keyword
    Local,
    /// new keyword
    New,
    /// break keyword
    Break,
    /// continue keyword
    Continue,
    /// import keyword
    Import,
    /// from keyword
    From,
    /// export keyword
    Export,
    /// default keyword
    Default,
}

impl Keyword {
    /// Look up a lexeme in the reserved-word list
    pub fn from_lexeme(text: &str) -> Option<Self> {
        let keyword = match text {
            "with" => Keyword::With,
            "do" => Keyword::Do,
            "end" => Keyword::End,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "then" => Keyword::Then,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "function" => Keyword::Function,
            "while" => Keyword::While,
            "return" => Keyword::Return,
            "class" => Keyword::Class,
            "extern" => Keyword::Extern,
            "local" => Keyword::Local,
            "new" => Keyword::New,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "import" => Keyword::Import,
            "from" => Keyword::From,
            "export" => Keyword::Export,
            "default" => Keyword::Default,
            _ => return None,
        };
        Some(keyword)
    }

    /// Source spelling of the keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::With => "with",
            Keyword::Do => "do",
            Keyword::End => "end",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Then => "then",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Function => "function",
            Keyword::While => "while",
            Keyword::Return => "return",
            Keyword::Class => "class",
            Keyword::Extern => "extern",
            Keyword::Local => "local",
            Keyword::New => "new",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::Import => "import",
            Keyword::From => "from",
            Keyword::Export => "export",
            Keyword::Default => "default",
        }
    }
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input
    Eof,
    /// String literal (text is the unescaped contents)
    String,
    /// Number literal
    Number,
    /// Reserved word
    Keyword,
    /// Identifier
    Identifier,
    /// One of `, ( ) [ ] { } :`
    Delimiter,
    /// Binary or unary operator, including `.` and `..`
    Operator,
    /// Plain assignment `=`
    Equals,
    /// Compound assignment such as `+=`
    CompoundAssign,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Delimiter => "DELIMITER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Equals => "EQUALS",
            TokenKind::CompoundAssign => "COMPOUND_ASSIGN",
        };
        f.write_str(name)
    }
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification
    pub kind: TokenKind,
    /// Normalized text (`and` is reported as `&&`, strings are unescaped)
    pub text: String,
    /// Inclusive source span of the lexeme
    pub span: Span,
}

impl Token {
    /// Whether this token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword.as_str()
    }
}

/// Multi-character and operator lexemes, scanned in order. The first textual
/// match wins, so longer forms are listed before their prefixes.
const OPERATORS: &[(&str, &str, TokenKind)] = &[
    ("+=", "+=", TokenKind::CompoundAssign),
    ("-=", "-=", TokenKind::CompoundAssign),
    ("*=", "*=", TokenKind::CompoundAssign),
    ("/=", "/=", TokenKind::CompoundAssign),
    ("%=", "%=", TokenKind::CompoundAssign),
    ("==", "==", TokenKind::Operator),
    ("!=", "!=", TokenKind::Operator),
    ("<=", "<=", TokenKind::Operator),
    (">=", ">=", TokenKind::Operator),
    ("<", "<", TokenKind::Operator),
    (">", ">", TokenKind::Operator),
    ("and", "&&", TokenKind::Operator),
    ("or", "||", TokenKind::Operator),
    ("not", "!", TokenKind::Operator),
    ("&&", "&&", TokenKind::Operator),
    ("||", "||", TokenKind::Operator),
    ("..", "..", TokenKind::Operator),
    ("+", "+", TokenKind::Operator),
    ("-", "-", TokenKind::Operator),
    ("*", "*", TokenKind::Operator),
    ("/", "/", TokenKind::Operator),
    ("%", "%", TokenKind::Operator),
    ("!", "!", TokenKind::Operator),
    (".", ".", TokenKind::Operator),
];

/// Lexer for KaLang source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    /// Index into `chars`
    position: usize,
    /// Byte offset matching `position`
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            position: 0,
            offset: 0,
            line: 0,
            column: 0,
        }
    }

    /// The text being lexed
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Lex the whole input, ending with (and including) the EOF token
    pub fn lex_all(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::debug!(count = tokens.len(), "lexed source");
        Ok(tokens)
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace_and_comments();

        if self.is_at_end() {
            let here = self.current_position();
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::at(here),
            });
        }

        if let Some(token) = self.scan_operator() {
            return Ok(token);
        }

        let start = self.current_position();
        let ch = self.peek();

        match ch {
            ',' | '(' | ')' | '[' | ']' | '{' | '}' | ':' => {
                self.advance();
                Ok(Token {
                    kind: TokenKind::Delimiter,
                    text: ch.to_string(),
                    span: Span::at(start),
                })
            }
            '=' => {
                self.advance();
                Ok(Token {
                    kind: TokenKind::Equals,
                    text: "=".to_string(),
                    span: Span::at(start),
                })
            }
            _ if ch.is_ascii_digit() => Ok(self.scan_number()),
            '"' | '\'' => self.scan_string(ch),
            _ if is_id_start(ch) => Ok(self.scan_identifier()),
            _ => Err(lexing_error(
                format!("unexpected character '{}'", ch),
                start,
            )),
        }
    }

    fn scan_operator(&mut self) -> Option<Token> {
        for (lexeme, display, kind) in OPERATORS {
            if !self.matches_ahead(lexeme) {
                continue;
            }
            // Word operators must not swallow the start of an identifier.
            let is_word = lexeme.chars().all(|c| c.is_ascii_alphabetic());
            if is_word {
                let next = self.chars.get(self.position + lexeme.len()).copied();
                if next.is_some_and(is_id_continue) {
                    continue;
                }
            }

            let start = self.current_position();
            let mut end = start;
            for _ in 0..lexeme.len() {
                end = self.current_position();
                self.advance();
            }
            return Some(Token {
                kind: *kind,
                text: (*display).to_string(),
                span: Span::new(start, end),
            });
        }
        None
    }

    fn scan_number(&mut self) -> Token {
        let start = self.current_position();
        let mut end = start;
        let mut text = String::new();

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            end = self.current_position();
            text.push(self.advance());
        }

        // A single fractional part; `1..2` is a range, not a fraction.
        if self.peek() == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            text.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                end = self.current_position();
                text.push(self.advance());
            }
        }

        Token {
            kind: TokenKind::Number,
            text,
            span: Span::new(start, end),
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, CompileError> {
        let start = self.current_position();
        let mut value = String::new();
        self.advance(); // Opening quote

        loop {
            if self.is_at_end() {
                return Err(lexing_error(
                    "unclosed string literal",
                    self.current_position(),
                ));
            }

            let ch = self.peek();
            if ch == '\\' {
                if self.peek_next().is_none() {
                    return Err(lexing_error(
                        "expected escape code after \\",
                        self.current_position(),
                    ));
                }
                self.advance();
                let code_position = self.current_position();
                let escaped = self.advance();
                match escaped {
                    '"' | '\'' => value.push(escaped),
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{0008}'),
                    _ => {
                        return Err(lexing_error(
                            format!("unknown escape code '\\{}'", escaped),
                            code_position,
                        ))
                    }
                }
            } else if ch == quote {
                let end = self.current_position();
                self.advance(); // Closing quote
                return Ok(Token {
                    kind: TokenKind::String,
                    text: value,
                    span: Span::new(start, end),
                });
            } else {
                value.push(self.advance());
            }
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.current_position();
        let mut end = start;
        let mut ident = String::new();

        while !self.is_at_end() && is_id_continue(self.peek()) {
            end = self.current_position();
            ident.push(self.advance());
        }

        let kind = if Keyword::from_lexeme(&ident).is_some() {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token {
            kind,
            text: ident,
            span: Span::new(start, end),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn matches_ahead(&self, lexeme: &str) -> bool {
        let mut index = self.position;
        for expected in lexeme.chars() {
            if self.chars.get(index) != Some(&expected) {
                return false;
            }
            index += 1;
        }
        true
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars.get(self.position).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        ch
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition::new(self.offset, self.line, self.column)
    }
}

fn is_id_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(source)
            .lex_all()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_lexer_empty_source() {
        let mut lexer = Lexer::new("");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Eof);
        assert_eq!(token.span, Span::default());
    }

    #[test]
    fn test_lexer_identifier() {
        let mut lexer = Lexer::new("foo_1");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.text, "foo_1");
        assert_eq!(token.span.end.column, 4);
    }

    #[test]
    fn test_lexer_number_with_fraction() {
        let mut lexer = Lexer::new("123.45");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(token.text, "123.45");
        assert_eq!(token.span.end.offset, 5);
    }

    #[test]
    fn test_lexer_range_is_not_a_fraction() {
        assert_eq!(
            kinds("0..10"),
            vec![
                (TokenKind::Number, "0".to_string()),
                (TokenKind::Operator, "..".to_string()),
                (TokenKind::Number, "10".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_lexer_string_escapes() {
        let mut lexer = Lexer::new(r#""a\"b\n""#);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "a\"b\n");
        assert_eq!(token.span.end.offset, 7);
    }

    #[test]
    fn test_lexer_keywords() {
        let tokens = kinds("function do end local");
        assert!(tokens[..4].iter().all(|(k, _)| *k == TokenKind::Keyword));
    }

    #[test]
    fn test_lexer_word_operators_are_aliased() {
        let tokens = kinds("a and b or not c");
        assert_eq!(tokens[1], (TokenKind::Operator, "&&".to_string()));
        assert_eq!(tokens[3], (TokenKind::Operator, "||".to_string()));
        assert_eq!(tokens[4], (TokenKind::Operator, "!".to_string()));
    }

    #[test]
    fn test_lexer_word_operator_needs_boundary() {
        let tokens = kinds("android order");
        assert_eq!(tokens[0], (TokenKind::Identifier, "android".to_string()));
        assert_eq!(tokens[1], (TokenKind::Identifier, "order".to_string()));
    }

    #[test]
    fn test_lexer_compound_assignment() {
        let tokens = kinds("x += 1 y = 2 z == 3");
        assert_eq!(tokens[1], (TokenKind::CompoundAssign, "+=".to_string()));
        assert_eq!(tokens[4], (TokenKind::Equals, "=".to_string()));
        assert_eq!(tokens[7], (TokenKind::Operator, "==".to_string()));
    }

    #[test]
    fn test_lexer_comments() {
        let tokens = kinds("# comment\nfoo # trailing\nbar");
        assert_eq!(tokens[0].1, "foo");
        assert_eq!(tokens[1].1, "bar");
    }

    #[test]
    fn test_lexer_tracks_lines_and_columns() {
        let tokens = Lexer::new("a\n  bc").lex_all().unwrap();
        assert_eq!(tokens[1].span.start, SourcePosition::new(4, 1, 2));
        assert_eq!(tokens[1].span.end, SourcePosition::new(5, 1, 3));
    }

    #[test]
    fn test_lexer_unterminated_string_points_at_end() {
        let err = Lexer::new("\"abc").lex_all().unwrap_err();
        match err {
            CompileError::Lexing { position, .. } => {
                assert_eq!(position, SourcePosition::new(4, 0, 4));
            }
            other => panic!("expected lexing error, got {:?}", other),
        }
    }

    #[test]
    fn test_lexer_unknown_escape() {
        let err = Lexer::new("'\\q'").lex_all().unwrap_err();
        assert_eq!(err.reason(), "unknown escape code '\\q'");
        assert_eq!(err.span().start.offset, 2);
    }

    #[test]
    fn test_lexer_unexpected_character() {
        let err = Lexer::new("a @").lex_all().unwrap_err();
        assert_eq!(err.reason(), "unexpected character '@'");
        assert_eq!(err.span().start.column, 2);
    }

    #[test]
    fn test_lexer_operator_at_end_of_input() {
        let tokens = kinds("a..");
        assert_eq!(tokens[1], (TokenKind::Operator, "..".to_string()));
    }
}
