//! # Query Language Front End
//!
//! Contextual tokenizer for the resource query language. The grammar that
//! turns tokens into clauses lives outside this crate and drives the lexer
//! through [`TokenStream`].

pub mod token;
pub mod lexer;

pub use token::{Span, Token, TokenKind};
pub use lexer::{DashMode, LabelState, Lexer, TokenStream, tokenize};
