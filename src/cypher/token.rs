//! Tokens produced by the lexer.

use std::fmt;

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text as written. Keywords keep their casing, strings keep
    /// their quotes.
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self { kind, literal: literal.into(), span }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Byte span into the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Match, Create, Where, Set, Delete, Return,
    In, As, Count, Sum, Contains,

    // Literals
    Ident, Number, String, Boolean, Null,

    // Punctuation
    LParen, RParen, LBrace, RBrace, LBracket, RBracket,
    Colon, Comma, Dot,

    // Relationship arrows
    RelNoPropsLeft,     // <-
    RelNoPropsRight,    // ->
    RelNoPropsNone,     // --
    RelBeginPropsLeft,  // <-[
    RelBeginPropsNone,  // -[
    RelEndPropsRight,   // ]->
    RelEndPropsNone,    // ]-

    // Comparisons
    Equals, NotEquals,
    LessThan, LessThanEquals,
    GreaterThan, GreaterThanEquals,
    RegexCompare,       // =~

    Eof,
    Illegal,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Match => "MATCH",
            TokenKind::Create => "CREATE",
            TokenKind::Where => "WHERE",
            TokenKind::Set => "SET",
            TokenKind::Delete => "DELETE",
            TokenKind::Return => "RETURN",
            TokenKind::In => "IN",
            TokenKind::As => "AS",
            TokenKind::Count => "COUNT",
            TokenKind::Sum => "SUM",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Ident => "IDENT",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Null => "NULL",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::RelNoPropsLeft => "REL_NOPROPS_LEFT",
            TokenKind::RelNoPropsRight => "REL_NOPROPS_RIGHT",
            TokenKind::RelNoPropsNone => "REL_NOPROPS_NONE",
            TokenKind::RelBeginPropsLeft => "REL_BEGINPROPS_LEFT",
            TokenKind::RelBeginPropsNone => "REL_BEGINPROPS_NONE",
            TokenKind::RelEndPropsRight => "REL_ENDPROPS_RIGHT",
            TokenKind::RelEndPropsNone => "REL_ENDPROPS_NONE",
            TokenKind::Equals => "EQUALS",
            TokenKind::NotEquals => "NOT_EQUALS",
            TokenKind::LessThan => "LESS_THAN",
            TokenKind::LessThanEquals => "LESS_THAN_EQUALS",
            TokenKind::GreaterThan => "GREATER_THAN",
            TokenKind::GreaterThanEquals => "GREATER_THAN_EQUALS",
            TokenKind::RegexCompare => "REGEX_COMPARE",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(self,
            TokenKind::Match | TokenKind::Create | TokenKind::Where |
            TokenKind::Set | TokenKind::Delete | TokenKind::Return |
            TokenKind::In | TokenKind::As | TokenKind::Count |
            TokenKind::Sum | TokenKind::Contains
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyword lookup, case-insensitive. `None` means a plain identifier.
pub(crate) fn keyword(s: &str) -> Option<TokenKind> {
    let kind = match s.to_ascii_uppercase().as_str() {
        "MATCH" => TokenKind::Match,
        "CREATE" => TokenKind::Create,
        "WHERE" => TokenKind::Where,
        "SET" => TokenKind::Set,
        "DELETE" => TokenKind::Delete,
        "RETURN" => TokenKind::Return,
        "IN" => TokenKind::In,
        "AS" => TokenKind::As,
        "COUNT" => TokenKind::Count,
        "SUM" => TokenKind::Sum,
        "CONTAINS" => TokenKind::Contains,
        "TRUE" | "FALSE" => TokenKind::Boolean,
        "NULL" => TokenKind::Null,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(keyword("match"), Some(TokenKind::Match));
        assert_eq!(keyword("ConTains"), Some(TokenKind::Contains));
        assert_eq!(keyword("False"), Some(TokenKind::Boolean));
        assert_eq!(keyword("pods"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TokenKind::RelEndPropsRight.to_string(), "REL_ENDPROPS_RIGHT");
        assert_eq!(TokenKind::LessThanEquals.to_string(), "LESS_THAN_EQUALS");
        assert!(TokenKind::Sum.is_keyword());
        assert!(!TokenKind::Boolean.is_keyword());
    }
}
