//! Field paths: addressing expressions into resource documents.
//!
//! Grammar: an optional `$` root, then `.`-separated keys, each optionally
//! followed by bracket suffixes:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `$.metadata.labels` | nested map keys |
//! | `spec.containers[].image` | `[]` select-all, stripped before lookup |
//! | `spec.containers[*].image` | same as `[]` |
//! | `spec.ports[0].port` | list index |
//!
//! A key applied to a list projects over its elements, so
//! `spec.containers.image` already yields every container image.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Value;
use crate::{Error, Result};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    segments: SmallVec<[Segment; 4]>,
}

impl FieldPath {
    /// Parse a path expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidPath {
            path: expr.to_string(),
            message: message.to_string(),
        };

        let body = expr.trim();
        let body = body.strip_prefix('$').unwrap_or(body);
        let body = body.strip_prefix('.').unwrap_or(body);

        let mut segments = SmallVec::new();
        if body.is_empty() {
            return Ok(Self { segments });
        }

        for part in body.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(i) => part.split_at(i),
                None => (part, ""),
            };
            if key.is_empty() {
                return Err(invalid("empty key"));
            }
            segments.push(Segment::Key(key.to_string()));

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                if !rest.starts_with('[') {
                    return Err(invalid("unexpected text after ']'"));
                }
                match &rest[1..close] {
                    "" | "*" => {}
                    n => {
                        let idx = n.parse::<usize>().map_err(|_| invalid("bad index"))?;
                        segments.push(Segment::Index(idx));
                    }
                }
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolve this path against a document.
    ///
    /// Borrows from `doc` when the path lands on a single node and allocates
    /// only when a key is projected over a list.
    pub fn lookup<'v>(&self, doc: &'v Value) -> Result<Cow<'v, Value>> {
        let mut current: Cow<'v, Value> = Cow::Borrowed(doc);
        for seg in &self.segments {
            current = match current {
                Cow::Borrowed(v) => self.step(v, seg)?,
                Cow::Owned(v) => Cow::Owned(self.step(&v, seg)?.into_owned()),
            };
        }
        Ok(current)
    }

    fn step<'v>(&self, value: &'v Value, seg: &Segment) -> Result<Cow<'v, Value>> {
        match (value, seg) {
            (Value::Map(m), Segment::Key(k)) => m
                .get(k)
                .map(Cow::Borrowed)
                .ok_or_else(|| self.lookup_error(format!("key '{k}' not found"))),
            (Value::List(items), Segment::Key(_)) => {
                let projected = items
                    .iter()
                    .filter_map(|item| self.step(item, seg).ok())
                    .map(Cow::into_owned)
                    .collect();
                Ok(Cow::Owned(Value::List(projected)))
            }
            (Value::List(items), Segment::Index(i)) => items
                .get(*i)
                .map(Cow::Borrowed)
                .ok_or_else(|| self.lookup_error(format!("index {i} out of range"))),
            (other, Segment::Key(k)) => Err(self.lookup_error(format!(
                "cannot select key '{k}' from {}",
                other.type_name()
            ))),
            (other, Segment::Index(i)) => Err(self.lookup_error(format!(
                "cannot index [{i}] into {}",
                other.type_name()
            ))),
        }
    }

    fn lookup_error(&self, message: String) -> Error {
        Error::PathLookup { path: self.to_string(), message }
    }
}

impl std::str::FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.segments {
            match seg {
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        Value::from(json!({
            "metadata": { "name": "web", "labels": { "app": "x" } },
            "spec": {
                "containers": [
                    { "name": "a", "image": "nginx:1.2" },
                    { "name": "b", "image": "busybox" },
                    { "name": "c" }
                ]
            }
        }))
    }

    #[test]
    fn test_parse_forms() {
        let p = FieldPath::parse("$.spec.containers[].image").unwrap();
        assert_eq!(p.to_string(), "$.spec.containers.image");
        let p = FieldPath::parse("spec.ports[0].port").unwrap();
        assert_eq!(p.segments()[2], Segment::Index(0));
        assert_eq!(p.to_string(), "$.spec.ports[0].port");
    }

    #[test]
    fn test_parse_errors() {
        assert!(FieldPath::parse("$.a..b").is_err());
        assert!(FieldPath::parse("$.a[0").is_err());
        assert!(FieldPath::parse("$.a[x]").is_err());
    }

    #[test]
    fn test_lookup_nested_map() {
        let d = doc();
        let p = FieldPath::parse("$.metadata.labels").unwrap();
        let v = p.lookup(&d).unwrap();
        assert!(matches!(v, Cow::Borrowed(_)));
        assert_eq!(v.get("app"), Some(&Value::from("x")));
    }

    #[test]
    fn test_lookup_projects_over_list() {
        let d = doc();
        let p = FieldPath::parse("$.spec.containers[].image").unwrap();
        assert_eq!(
            p.lookup(&d).unwrap().into_owned(),
            Value::List(vec![Value::from("nginx:1.2"), Value::from("busybox")])
        );
    }

    #[test]
    fn test_lookup_index() {
        let d = doc();
        let p = FieldPath::parse("spec.containers[1].name").unwrap();
        assert_eq!(p.lookup(&d).unwrap().as_str(), Some("b"));
        assert!(FieldPath::parse("spec.containers[9]").unwrap().lookup(&d).is_err());
    }

    #[test]
    fn test_lookup_missing_key() {
        let d = doc();
        let err = FieldPath::parse("$.spec.selector").unwrap().lookup(&d).unwrap_err();
        assert!(err.to_string().contains("selector"));
    }

    #[test]
    fn test_root_path() {
        let d = doc();
        assert_eq!(FieldPath::parse("$").unwrap().lookup(&d).unwrap().into_owned(), d);
    }
}
