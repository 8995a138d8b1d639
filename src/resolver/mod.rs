//! Relationship resolution.
//!
//! Given two resource collections and a [`RelationshipRule`], finds every
//! related pair and splits the participants into a `left` and a `right`
//! side, each deduplicated by resource identity (`metadata.name`).
//!
//! Stateless: a [`Resolution`] borrows from the inputs, and resolutions over
//! the same data may run concurrently.

pub mod matcher;
pub mod rules;

pub use matcher::{CompiledCriteria, match_contains_all, match_fields, matches};
pub use rules::RuleSet;

use tracing::debug;

use crate::model::{Direction, RelationshipRule, RelationshipType, Value};
use crate::Result;

/// Matched resources, split by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution<'r> {
    left: Vec<&'r Value>,
    right: Vec<&'r Value>,
}

impl<'r> Resolution<'r> {
    pub fn left(&self) -> &[&'r Value] {
        &self.left
    }

    pub fn right(&self) -> &[&'r Value] {
        &self.right
    }

    /// Side by key, `"left"` or `"right"`.
    pub fn side(&self, key: &str) -> Option<&[&'r Value]> {
        match key {
            "left" => Some(&self.left),
            "right" => Some(&self.right),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// `{"left": [...], "right": [...]}`
    pub fn to_json(&self) -> serde_json::Value {
        let side = |items: &[&Value]| {
            serde_json::Value::Array(items.iter().map(|v| serde_json::Value::from(*v)).collect())
        };
        serde_json::json!({
            "left": side(self.left.as_slice()),
            "right": side(self.right.as_slice()),
        })
    }
}

/// Resolves relationships against an injected rule table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'s> {
    rules: &'s RuleSet,
}

impl<'s> Resolver<'s> {
    pub fn new(rules: &'s RuleSet) -> Self {
        Self { rules }
    }

    /// Look up the rule for `relationship` and resolve with it.
    ///
    /// An unknown relationship type fails before any pair is examined.
    pub fn resolve<'r>(
        &self,
        relationship: &RelationshipType,
        resources_a: &'r [Value],
        resources_b: &'r [Value],
        direction: Direction,
    ) -> Result<Resolution<'r>> {
        let rule = self.rules.find_rule(relationship)?;
        Ok(resolve(resources_a, resources_b, rule, direction))
    }
}

/// Evaluate `rule` on every pair in `resources_a × resources_b`.
///
/// Routing of a matched pair `(a, b)`:
///
/// | Direction | `right` | `left` |
/// |-----------|---------|--------|
/// | `Left`    | a       | b      |
/// | `Right`   | b       | a      |
///
/// `Both` and `None` route nothing; the caller decides what they mean.
pub fn resolve<'r>(
    resources_a: &'r [Value],
    resources_b: &'r [Value],
    rule: &RelationshipRule,
    direction: Direction,
) -> Resolution<'r> {
    let mut resolution = Resolution::default();
    if matches!(direction, Direction::Both | Direction::None) {
        debug!(relationship = %rule.relationship, %direction, "direction routes no resources");
        return resolution;
    }

    let criteria = CompiledCriteria::new(&rule.match_criteria);
    for a in resources_a {
        for b in resources_b {
            if !criteria.matches(a, b) {
                continue;
            }
            let (right, left) = match direction {
                Direction::Left => (a, b),
                _ => (b, a),
            };
            push_unique(&mut resolution.right, right);
            push_unique(&mut resolution.left, left);
        }
    }

    debug!(
        relationship = %rule.relationship,
        %direction,
        left = resolution.left.len(),
        right = resolution.right.len(),
        "resolved relationship"
    );
    resolution
}

/// A resource's identity: its `metadata.name` string.
pub fn identity(resource: &Value) -> Option<&str> {
    resource.get("metadata")?.get("name")?.as_str()
}

/// Resources without an identity are never considered already present.
fn push_unique<'r>(side: &mut Vec<&'r Value>, resource: &'r Value) {
    let present = identity(resource)
        .is_some_and(|name| side.iter().any(|seen| identity(seen) == Some(name)));
    if !present {
        side.push(resource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchCriterion;
    use serde_json::json;

    fn named(name: &str, extra: serde_json::Value) -> Value {
        let mut v = json!({"metadata": {"name": name}});
        if let (Some(dst), Some(src)) = (v.as_object_mut(), extra.as_object()) {
            for (k, val) in src {
                if k == "metadata" {
                    if let (Some(md), Some(extra_md)) = (dst["metadata"].as_object_mut(), val.as_object()) {
                        md.extend(extra_md.clone());
                    }
                } else {
                    dst.insert(k.clone(), val.clone());
                }
            }
        }
        Value::from(v)
    }

    fn names(side: &[&Value]) -> Vec<String> {
        side.iter().filter_map(|v| identity(v)).map(String::from).collect()
    }

    fn selector_rule() -> RelationshipRule {
        RelationshipRule::new("pods", "services", "SERVICE_EXPOSE_POD")
            .with_criterion(MatchCriterion::contains_all("$.metadata.labels", "$.spec.selector"))
    }

    #[test]
    fn test_left_and_right_routing() {
        let pods = vec![named("p1", json!({"metadata": {"labels": {"app": "x"}}}))];
        let svcs = vec![named("s1", json!({"spec": {"selector": {"app": "x"}}}))];
        let rule = selector_rule();

        let left = resolve(&pods, &svcs, &rule, Direction::Left);
        assert_eq!(names(left.right()), vec!["p1"]);
        assert_eq!(names(left.left()), vec!["s1"]);

        let right = resolve(&pods, &svcs, &rule, Direction::Right);
        assert_eq!(names(right.right()), vec!["s1"]);
        assert_eq!(names(right.left()), vec!["p1"]);
    }

    #[test]
    fn test_dedup_by_name() {
        let pods = vec![
            named("p1", json!({"metadata": {"labels": {"app": "x"}}})),
            named("p2", json!({"metadata": {"labels": {"app": "x"}}})),
        ];
        let svcs = vec![
            named("s1", json!({"spec": {"selector": {"app": "x"}}})),
            named("s1", json!({"spec": {"selector": {"app": "x"}}})),
        ];
        let res = resolve(&pods, &svcs, &selector_rule(), Direction::Left);
        assert_eq!(names(res.right()), vec!["p1", "p2"]);
        assert_eq!(names(res.left()), vec!["s1"]);
    }

    #[test]
    fn test_both_and_none_route_nothing() {
        let pods = vec![named("p1", json!({"metadata": {"labels": {"app": "x"}}}))];
        let svcs = vec![named("s1", json!({"spec": {"selector": {"app": "x"}}}))];
        assert!(resolve(&pods, &svcs, &selector_rule(), Direction::Both).is_empty());
        assert!(resolve(&pods, &svcs, &selector_rule(), Direction::None).is_empty());
    }

    #[test]
    fn test_nameless_resources_do_not_panic() {
        let a = vec![Value::from(json!({"metadata": {"labels": {"app": "x"}}})), Value::from(json!({"metadata": {"labels": {"app": "x"}}}))];
        let b = vec![named("s1", json!({"spec": {"selector": {"app": "x"}}}))];
        let res = resolve(&a, &b, &selector_rule(), Direction::Left);
        assert_eq!(res.right().len(), 2);
        assert_eq!(res.left().len(), 1);
    }

    #[test]
    fn test_side_lookup_and_json() {
        let pods = vec![named("p1", json!({"metadata": {"labels": {"app": "x"}}}))];
        let svcs = vec![named("s1", json!({"spec": {"selector": {"app": "x"}}}))];
        let res = resolve(&pods, &svcs, &selector_rule(), Direction::Left);
        assert_eq!(res.side("right").map(<[_]>::len), Some(1));
        assert!(res.side("up").is_none());
        let json = res.to_json();
        assert_eq!(json["left"][0]["metadata"]["name"], "s1");
        assert_eq!(json["right"][0]["metadata"]["name"], "p1");
    }

    #[test]
    fn test_unparseable_rule_path_resolves_nothing() {
        let pods = vec![named("p1", json!({"metadata": {"labels": {"app": "x"}}}))];
        let svcs = vec![named("s1", json!({"spec": {"selector": {"app": "x"}}}))];
        let rule = RelationshipRule::new("pods", "services", "BROKEN")
            .with_criterion(MatchCriterion::contains_all("$.metadata.labels[", "$.spec.selector"));
        assert!(resolve(&pods, &svcs, &rule, Direction::Left).is_empty());
        assert!(resolve(&pods, &svcs, &rule, Direction::Right).is_empty());
    }

    #[test]
    fn test_resolver_unknown_type_is_fatal() {
        let rules = RuleSet::builtin();
        let err = Resolver::new(&rules)
            .resolve(&RelationshipType::new("NOPE"), &[], &[], Direction::Left)
            .unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }
}
