//! Relationship rule registry.

use serde::{Deserialize, Serialize};

use crate::model::{MatchCriterion, RelationshipRule, RelationshipType};
use crate::{Error, Result};

/// Immutable table of relationship rules.
///
/// Passed to the resolver explicitly, so independent rule sets can coexist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<RelationshipRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RelationshipRule>) -> Self {
        Self { rules }
    }

    /// Load a rule table from its JSON form (an array of rules).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn rules(&self) -> &[RelationshipRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by relationship type. First registration wins.
    pub fn find_rule(&self, relationship: &RelationshipType) -> Result<&RelationshipRule> {
        self.rules
            .iter()
            .find(|rule| &rule.relationship == relationship)
            .ok_or_else(|| Error::RuleNotFound(relationship.clone()))
    }

    /// First rule connecting the two kinds, in either orientation.
    pub fn find_by_kinds(&self, kind_a: &str, kind_b: &str) -> Option<&RelationshipRule> {
        self.rules.iter().find(|rule| rule.connects(kind_a, kind_b))
    }

    /// Standard Kubernetes relationships.
    pub fn builtin() -> Self {
        let owned_by = || MatchCriterion::exact_match("$.metadata.ownerReferences[].name", "$.metadata.name");

        Self::new(vec![
            RelationshipRule::new("replicasets", "deployments", "DEPLOYMENT_OWN_REPLICASET")
                .with_criterion(owned_by()),
            RelationshipRule::new("pods", "replicasets", "REPLICASET_OWN_POD")
                .with_criterion(owned_by()),
            RelationshipRule::new("pods", "statefulsets", "STATEFULSET_OWN_POD")
                .with_criterion(owned_by()),
            RelationshipRule::new("pods", "daemonsets", "DAEMONSET_OWN_POD")
                .with_criterion(owned_by()),
            RelationshipRule::new("pods", "jobs", "JOB_OWN_POD")
                .with_criterion(owned_by()),
            RelationshipRule::new("pods", "services", "SERVICE_EXPOSE_POD")
                .with_criterion(MatchCriterion::contains_all("$.metadata.labels", "$.spec.selector")),
            RelationshipRule::new("ingresses", "services", "INGRESS_ROUTE_SERVICE")
                .with_criterion(MatchCriterion::exact_match(
                    "$.spec.rules[].http.paths[].backend.service.name",
                    "$.metadata.name",
                )),
            RelationshipRule::new("pods", "configmaps", "POD_USE_CONFIGMAP")
                .with_criterion(MatchCriterion::exact_match("$.spec.volumes[].configMap.name", "$.metadata.name")),
            RelationshipRule::new("pods", "secrets", "POD_USE_SECRET")
                .with_criterion(MatchCriterion::exact_match("$.spec.volumes[].secret.secretName", "$.metadata.name")),
            RelationshipRule::new("pods", "persistentvolumeclaims", "POD_USE_PVC")
                .with_criterion(MatchCriterion::exact_match(
                    "$.spec.volumes[].persistentVolumeClaim.claimName",
                    "$.metadata.name",
                )),
            RelationshipRule::new("persistentvolumeclaims", "persistentvolumes", "PVC_BOUND_PV")
                .with_criterion(MatchCriterion::exact_match("$.spec.volumeName", "$.metadata.name")),
            RelationshipRule::new("horizontalpodautoscalers", "deployments", "HPA_SCALE_DEPLOYMENT")
                .with_criterion(MatchCriterion::exact_match("$.spec.scaleTargetRef.name", "$.metadata.name")),
            RelationshipRule::new("networkpolicies", "pods", "NETWORKPOLICY_APPLY_POD")
                .with_criterion(MatchCriterion::contains_all("$.metadata.labels", "$.spec.podSelector.matchLabels")),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComparisonType;

    #[test]
    fn test_find_rule() {
        let rules = RuleSet::builtin();
        let rule = rules.find_rule(&RelationshipType::new("SERVICE_EXPOSE_POD")).unwrap();
        assert_eq!(rule.kind_a, "pods");
        assert_eq!(rule.match_criteria[0].comparison, ComparisonType::ContainsAll);
    }

    #[test]
    fn test_find_rule_not_found() {
        let rules = RuleSet::builtin();
        let err = rules.find_rule(&RelationshipType::new("POD_HUG_POD")).unwrap_err();
        assert!(matches!(&err, Error::RuleNotFound(t) if t.as_str() == "POD_HUG_POD"));
        assert_eq!(err.to_string(), "rule not found for relationship type: POD_HUG_POD");
    }

    #[test]
    fn test_empty_set() {
        let rules = RuleSet::default();
        assert!(rules.is_empty());
        assert!(rules.find_rule(&"ANY".into()).is_err());
    }

    #[test]
    fn test_find_by_kinds() {
        let rules = RuleSet::builtin();
        let rule = rules.find_by_kinds("deployments", "replicasets").unwrap();
        assert_eq!(rule.relationship.as_str(), "DEPLOYMENT_OWN_REPLICASET");
        assert!(rules.find_by_kinds("pods", "nodes").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let rules = RuleSet::builtin();
        let json = rules.to_json().unwrap();
        assert_eq!(RuleSet::from_json(&json).unwrap(), rules);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = RuleSet::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
