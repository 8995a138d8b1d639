//! Relationship rules between resource kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a relationship rule, e.g. `SERVICE_EXPOSE_POD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipType(pub String);

impl RelationshipType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RelationshipType {
    fn from(s: &str) -> Self { Self::new(s) }
}

/// Traversal direction requested by the caller of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Both,
    None,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Both => "both",
            Direction::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "both" => Ok(Direction::Both),
            "none" => Ok(Direction::None),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// How the two fields of a [`MatchCriterion`] are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonType {
    /// Label-selector semantics: every selector entry (field B) must be
    /// present with an equal value in the labels (field A).
    ContainsAll,
    /// Field B's value must occur somewhere inside field A, at any depth.
    ExactMatch,
}

/// One field-pair comparison inside a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriterion {
    /// Path evaluated on resource A.
    pub field_a: String,
    /// Path evaluated on resource B.
    pub field_b: String,
    pub comparison: ComparisonType,
}

impl MatchCriterion {
    pub fn new(field_a: impl Into<String>, field_b: impl Into<String>, comparison: ComparisonType) -> Self {
        Self {
            field_a: field_a.into(),
            field_b: field_b.into(),
            comparison,
        }
    }

    pub fn contains_all(field_a: impl Into<String>, field_b: impl Into<String>) -> Self {
        Self::new(field_a, field_b, ComparisonType::ContainsAll)
    }

    pub fn exact_match(field_a: impl Into<String>, field_b: impl Into<String>) -> Self {
        Self::new(field_a, field_b, ComparisonType::ExactMatch)
    }
}

/// A named, ordered set of criteria connecting two resource kinds.
///
/// A pair of resources is related when every criterion matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRule {
    /// Kind of resource A, e.g. `pods`.
    pub kind_a: String,
    /// Kind of resource B, e.g. `services`.
    pub kind_b: String,
    pub relationship: RelationshipType,
    pub match_criteria: Vec<MatchCriterion>,
}

impl RelationshipRule {
    pub fn new(
        kind_a: impl Into<String>,
        kind_b: impl Into<String>,
        relationship: impl Into<RelationshipType>,
    ) -> Self {
        Self {
            kind_a: kind_a.into(),
            kind_b: kind_b.into(),
            relationship: relationship.into(),
            match_criteria: Vec::new(),
        }
    }

    pub fn with_criterion(mut self, criterion: MatchCriterion) -> Self {
        self.match_criteria.push(criterion);
        self
    }

    /// True if this rule connects `a` and `b` in either orientation.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        let (ka, kb) = (self.kind_a.as_str(), self.kind_b.as_str());
        (ka.eq_ignore_ascii_case(a) && kb.eq_ignore_ascii_case(b))
            || (ka.eq_ignore_ascii_case(b) && kb.eq_ignore_ascii_case(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("Left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("none".parse::<Direction>(), Ok(Direction::None));
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(Direction::Both.to_string(), "both");
    }

    #[test]
    fn test_rule_builder_keeps_order() {
        let rule = RelationshipRule::new("pods", "services", "SERVICE_EXPOSE_POD")
            .with_criterion(MatchCriterion::contains_all("$.metadata.labels", "$.spec.selector"))
            .with_criterion(MatchCriterion::exact_match("$.metadata.namespace", "$.metadata.namespace"));
        assert_eq!(rule.match_criteria.len(), 2);
        assert_eq!(rule.match_criteria[0].comparison, ComparisonType::ContainsAll);
        assert_eq!(rule.match_criteria[1].comparison, ComparisonType::ExactMatch);
    }

    #[test]
    fn test_connects_either_orientation() {
        let rule = RelationshipRule::new("pods", "services", "SERVICE_EXPOSE_POD");
        assert!(rule.connects("Services", "pods"));
        assert!(rule.connects("pods", "services"));
        assert!(!rule.connects("pods", "pods"));
    }
}
