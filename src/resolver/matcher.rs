//! Criterion evaluation between two resources.
//!
//! A criterion that cannot be evaluated (bad path, missing field, wrong
//! shape, vacuous selector) does not match. Nothing here returns an error.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::debug;

use crate::model::{ComparisonType, FieldPath, MatchCriterion, Value};

/// True if every criterion matches, in order. Stops at the first failure.
///
/// Parses the criteria's paths on every call. Use [`CompiledCriteria`] to
/// evaluate the same criteria over many pairs.
pub fn matches(resource_a: &Value, resource_b: &Value, criteria: &[MatchCriterion]) -> bool {
    CompiledCriteria::new(criteria).matches(resource_a, resource_b)
}

/// Match criteria with their field paths parsed up front.
#[derive(Debug, Clone, Default)]
pub struct CompiledCriteria {
    criteria: Vec<CompiledCriterion>,
}

/// `None` marks a path that failed to parse; the criterion never matches.
#[derive(Debug, Clone)]
struct CompiledCriterion {
    field_a: Option<FieldPath>,
    field_b: Option<FieldPath>,
    comparison: ComparisonType,
}

impl CompiledCriteria {
    pub fn new(criteria: &[MatchCriterion]) -> Self {
        let criteria = criteria
            .iter()
            .map(|c| CompiledCriterion {
                field_a: parse_field(&c.field_a),
                field_b: parse_field(&c.field_b),
                comparison: c.comparison,
            })
            .collect();
        Self { criteria }
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// True if every criterion matches, in order. Stops at the first failure.
    pub fn matches(&self, resource_a: &Value, resource_b: &Value) -> bool {
        self.criteria.iter().all(|c| c.matches(resource_a, resource_b))
    }
}

impl CompiledCriterion {
    fn matches(&self, resource_a: &Value, resource_b: &Value) -> bool {
        let (Some(path_a), Some(path_b)) = (&self.field_a, &self.field_b) else {
            return false;
        };
        let Some(field_a) = resolve_field(resource_a, path_a) else {
            return false;
        };
        let Some(field_b) = resolve_field(resource_b, path_b) else {
            return false;
        };

        match self.comparison {
            ComparisonType::ContainsAll => {
                let Some(labels) = field_a.as_map() else {
                    debug!(path = %path_a, got = field_a.type_name(), "labels are not a map");
                    return false;
                };
                let Some(selector) = field_b.as_map() else {
                    debug!(path = %path_b, got = field_b.type_name(), "selector is not a map");
                    return false;
                };
                match_contains_all(labels, selector)
            }
            ComparisonType::ExactMatch => match_fields(&field_a, &field_b),
        }
    }
}

fn parse_field(expr: &str) -> Option<FieldPath> {
    match FieldPath::parse(expr) {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(error = %err, "criterion path does not parse");
            None
        }
    }
}

fn resolve_field<'v>(resource: &'v Value, path: &FieldPath) -> Option<Cow<'v, Value>> {
    match path.lookup(resource) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "field lookup failed");
            None
        }
    }
}

/// Label-selector containment: every selector entry is present in `labels`
/// with an equal value. Empty selectors and empty label sets never match.
pub fn match_contains_all(labels: &HashMap<String, Value>, selector: &HashMap<String, Value>) -> bool {
    if selector.is_empty() || labels.is_empty() {
        return false;
    }
    selector
        .iter()
        .all(|(key, want)| labels.get(key).is_some_and(|have| have.loose_eq(want)))
}

/// Deep existential search: does `field_b` occur anywhere inside `field_a`?
///
/// Scalars compare by value, lists match if any element does, maps match if
/// any value does. `Null` never matches.
pub fn match_fields(field_a: &Value, field_b: &Value) -> bool {
    match field_a {
        Value::Null => false,
        Value::List(items) => items.iter().any(|item| match_fields(item, field_b)),
        Value::Map(entries) => entries.values().any(|value| match_fields(value, field_b)),
        scalar => scalar.loose_eq(field_b),
    }
}
