//! Contextual lexer: tokenizes a query string.
//!
//! The same characters mean different things depending on where the grammar
//! is, so the lexer carries two pieces of mode state:
//!
//! - **Label state**: entered by `:`, left by `)`. Inside it, identifiers
//!   absorb `.ident` continuations (`deployments.apps`) and keywords are not
//!   recognized.
//! - **Dash mode**: set by the parser while it reads a relationship
//!   direction. A bare `-` is then `IDENT("-")` instead of `ILLEGAL`.
//!
//! Lexical errors never abort the scan; they come back as `ILLEGAL` tokens.

use tracing::trace;

use super::token::{keyword, Span, Token, TokenKind};

/// The token contract an external parser drives.
pub trait TokenStream {
    /// Next token. Returns `EOF` forever once the input is exhausted.
    fn next_token(&mut self) -> Token;

    /// Next raw character, without skipping whitespace.
    fn peek_char(&self) -> Option<char>;

    /// Toggle whether a bare `-` is an identifier-like token.
    fn set_direction_context(&mut self, on: bool);
}

/// Whether the lexer sits in a node-label position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelState {
    #[default]
    Outside,
    Inside,
}

/// How a bare `-` is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashMode {
    #[default]
    Illegal,
    /// Direction context: `-` is `IDENT("-")`.
    Ident,
}

/// Lexer state, one instance per token stream.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    pending: Option<Token>,
    label: LabelState,
    dash: DashMode,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            pending: None,
            label: LabelState::Outside,
            dash: DashMode::Illegal,
        }
    }

    /// Return the buffered token if there is one, otherwise scan the next.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.pending.take() {
            return tok;
        }
        let tok = self.scan();
        trace!(kind = %tok.kind, literal = %tok.literal, start = tok.span.start, "token");
        tok
    }

    /// Push a token back so the next [`Lexer::next_token`] returns it.
    ///
    /// The buffer holds one token; a token already buffered is displaced and
    /// returned.
    pub fn push_back(&mut self, token: Token) -> Option<Token> {
        self.pending.replace(token)
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn set_direction_context(&mut self, on: bool) {
        self.dash = if on { DashMode::Ident } else { DashMode::Illegal };
    }

    pub fn in_label(&self) -> bool {
        self.label == LabelState::Inside
    }

    pub fn in_direction_context(&self) -> bool {
        self.dash == DashMode::Ident
    }

    // ========================================================================
    // Character cursor
    // ========================================================================

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn emit(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.input[start..self.pos], Span { start, end: self.pos })
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    fn scan(&mut self) -> Token {
        if let Some(illegal) = self.skip_trivia() {
            return illegal;
        }

        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Token::new(TokenKind::Eof, "", Span { start, end: start });
        };

        match ch {
            c if is_ident_start(c) => self.scan_identifier(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '"' => self.scan_string(start),

            '[' => self.emit(TokenKind::LBracket, start),
            ']' => {
                let kind = if self.eat('-') {
                    if self.eat('>') {
                        TokenKind::RelEndPropsRight
                    } else {
                        TokenKind::RelEndPropsNone
                    }
                } else {
                    TokenKind::RBracket
                };
                self.emit(kind, start)
            }
            '(' => self.emit(TokenKind::LParen, start),
            ')' => {
                self.label = LabelState::Outside;
                self.emit(TokenKind::RParen, start)
            }
            '{' => self.emit(TokenKind::LBrace, start),
            '}' => self.emit(TokenKind::RBrace, start),
            ':' => {
                self.label = LabelState::Inside;
                self.emit(TokenKind::Colon, start)
            }
            ',' => self.emit(TokenKind::Comma, start),
            '.' => self.emit(TokenKind::Dot, start),

            '=' => {
                let kind = if self.eat('~') { TokenKind::RegexCompare } else { TokenKind::Equals };
                self.emit(kind, start)
            }
            '!' => {
                let kind = if self.eat('=') { TokenKind::NotEquals } else { TokenKind::Illegal };
                self.emit(kind, start)
            }
            '-' => {
                let kind = if self.eat('>') {
                    TokenKind::RelNoPropsRight
                } else if self.eat('[') {
                    TokenKind::RelBeginPropsNone
                } else if self.eat('-') {
                    TokenKind::RelNoPropsNone
                } else {
                    match self.dash {
                        DashMode::Ident => TokenKind::Ident,
                        DashMode::Illegal => TokenKind::Illegal,
                    }
                };
                self.emit(kind, start)
            }
            '<' => {
                let kind = if self.eat('-') {
                    if self.eat('[') {
                        TokenKind::RelBeginPropsLeft
                    } else {
                        TokenKind::RelNoPropsLeft
                    }
                } else if self.eat('=') {
                    TokenKind::LessThanEquals
                } else if self.eat('<') {
                    TokenKind::Illegal
                } else {
                    TokenKind::LessThan
                };
                self.emit(kind, start)
            }
            '>' => {
                let kind = if self.eat('=') {
                    TokenKind::GreaterThanEquals
                } else {
                    TokenKind::GreaterThan
                };
                self.emit(kind, start)
            }

            _ => self.emit(TokenKind::Illegal, start),
        }
    }

    /// Skip whitespace and comments. An unterminated block comment comes
    /// back as an `ILLEGAL` token covering the rest of the input.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            // Newlines are insignificant, including right after a comment.
            self.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));

            if self.rest().starts_with("//") {
                self.eat_while(|c| c != '\n');
            } else if self.rest().starts_with("/*") {
                let start = self.pos;
                match self.rest()[2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => {
                        self.pos = self.input.len();
                        return Some(self.emit(TokenKind::Illegal, start));
                    }
                }
            } else {
                return None;
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        self.eat_while(is_ident_continue);

        if self.label == LabelState::Outside {
            let kind = keyword(&self.input[start..self.pos]).unwrap_or(TokenKind::Ident);
            return self.emit(kind, start);
        }

        // Qualified label: `deployments.apps`, `a.b.c`
        // A dangling dot ends the label as `ILLEGAL("a.")` and leaves the next
        // character alone, so `:a. b` gives `ILLEGAL`, `IDENT(b)` and `:a.)`
        // still emits `)`. Never join across the gap or swallow the next token.
        while self.eat('.') {
            if !self.peek().is_some_and(is_ident_start) {
                return self.emit(TokenKind::Illegal, start);
            }
            self.eat_while(is_ident_continue);
        }
        self.emit(TokenKind::Ident, start)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        self.eat_while(|c| c.is_ascii_digit());

        // Only integers belong to the grammar; a fraction or exponent is
        // scanned whole and rejected.
        let mut real = false;
        if self.eat('.') {
            real = true;
            self.eat_while(|c| c.is_ascii_digit());
        }
        if self.eat('e') || self.eat('E') {
            real = true;
            if !self.eat('+') {
                self.eat('-');
            }
            self.eat_while(|c| c.is_ascii_digit());
        }

        let kind = if real { TokenKind::Illegal } else { TokenKind::Number };
        self.emit(kind, start)
    }

    fn scan_string(&mut self, start: usize) -> Token {
        loop {
            match self.peek() {
                None | Some('\n') => return self.emit(TokenKind::Illegal, start),
                Some('"') => {
                    self.bump();
                    return self.emit(TokenKind::String, start);
                }
                Some('\\') => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }
}

impl TokenStream for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        Lexer::next_token(self)
    }

    fn peek_char(&self) -> Option<char> {
        self.peek()
    }

    fn set_direction_context(&mut self, on: bool) {
        Lexer::set_direction_context(self, on)
    }
}

/// Yields tokens up to, not including, `EOF`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let tok = self.next_token();
        (!tok.is_eof()).then_some(tok)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize a whole query string. The last token is always `EOF`.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        let done = tok.is_eof();
        tokens.push(tok);
        if done {
            return tokens;
        }
    }
}
