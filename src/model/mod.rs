//! # Resource Model
//!
//! Plain data shared by the lexer's consumers and the resolver: resource
//! documents, field paths, and relationship rules.
//!
//! This module is pure data: no I/O, no state.

pub mod value;
pub mod path;
pub mod relationship;

pub use value::Value;
pub use path::{FieldPath, Segment};
pub use relationship::{
    Direction, RelationshipType, ComparisonType, MatchCriterion, RelationshipRule,
};
