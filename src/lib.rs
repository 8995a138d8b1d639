//! # resource-cypher: Cypher-style queries over structured resources
//!
//! Front end for a Cypher-inspired language that describes patterns over a
//! graph of resource documents (nested `metadata` / `spec` trees such as
//! Kubernetes objects).
//!
//! ## Components
//!
//! 1. **Contextual lexer** (`cypher`): query text → typed tokens. Label mode
//!    and direction context decide what `-`, `:` and dotted names mean.
//! 2. **Relationship resolver** (`resolver`): two resource collections plus a
//!    [`RelationshipRule`] → matched, identity-deduplicated, direction-partitioned
//!    resources.
//!
//! The two never call each other. The lexer feeds an external grammar; the
//! resolver is driven by query execution against a [`RuleSet`].
//!
//! ## Quick Start
//!
//! ```rust
//! use resource_cypher::{Direction, RelationshipType, Resolver, RuleSet, Value};
//! use serde_json::json;
//!
//! # fn example() -> resource_cypher::Result<()> {
//! let rules = RuleSet::builtin();
//! let pods: Vec<Value> = vec![json!({
//!     "metadata": { "name": "web-1", "labels": { "app": "web" } }
//! }).into()];
//! let services: Vec<Value> = vec![json!({
//!     "metadata": { "name": "web" },
//!     "spec": { "selector": { "app": "web" } }
//! }).into()];
//!
//! let resolution = Resolver::new(&rules).resolve(
//!     &RelationshipType::new("SERVICE_EXPOSE_POD"),
//!     &pods,
//!     &services,
//!     Direction::Left,
//! )?;
//! assert_eq!(resolution.right().len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod cypher;
pub mod resolver;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Value, FieldPath,
    Direction, RelationshipType, ComparisonType, MatchCriterion, RelationshipRule,
};

// ============================================================================
// Re-exports: Lexer
// ============================================================================

pub use cypher::{Lexer, Token, TokenKind, TokenStream, tokenize};

// ============================================================================
// Re-exports: Resolver
// ============================================================================

pub use resolver::{Resolution, Resolver, RuleSet, resolve};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("rule not found for relationship type: {0}")]
    RuleNotFound(RelationshipType),

    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("Path lookup failed for '{path}': {message}")]
    PathLookup { path: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
