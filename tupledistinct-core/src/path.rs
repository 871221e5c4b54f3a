//! Dot-notation field paths
//!
//! A [`FieldPath`] is parsed once per request and then resolved against every
//! document of the stream. Resolution never fails: a path that cannot be
//! walked yields `None` ("absent"), which is different from `Some(&Value::Null)`
//! (a stored null).

use serde_json::Value;
use std::fmt;

/// A parsed dot-delimited path such as `"address.city"` or `"items.0.sku"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-delimited path. The empty string parses to a path that
    /// never resolves.
    pub fn parse(path: &str) -> Self {
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split('.').map(str::to_string).collect()
        };
        FieldPath {
            raw: path.to_string(),
            segments,
        }
    }

    /// A path that resolves to absent for every document.
    ///
    /// Stands in for a non-string element of a JSON path list so the
    /// remaining paths keep their positions.
    pub fn unresolvable() -> Self {
        FieldPath {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_resolvable(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Walk `doc` along this path.
    ///
    /// At every step the current value must be an object owning the segment
    /// (or an array and the segment a valid index). Anything else, including a
    /// `null` intermediate, ends the walk with `None`.
    pub fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        if self.segments.is_empty() {
            return None;
        }

        let mut current = doc;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment.as_str())?,
                Value::Array(items) => items.get(array_index(segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Canonical decimal index only: no sign, no leading zeros except "0" itself
fn array_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::parse(path)
    }
}

/// Resolve a raw dot-notation string against a document
pub fn resolve<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    FieldPath::parse(path).resolve(doc)
}

/// The `paths` argument of a distinct-tuple request.
///
/// Either one path (flat output when counting is off) or an ordered list.
/// `Invalid` covers every other shape a dynamic caller can hand in; it
/// produces an empty result rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    Single(String),
    Many(Vec<FieldPath>),
    Invalid,
}

impl PathSpec {
    /// Interpret a JSON request value: a string, or an array whose string
    /// elements are paths. Non-string array elements keep their slot but
    /// never resolve.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => PathSpec::Single(s.clone()),
            Value::Array(items) => PathSpec::Many(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => FieldPath::parse(s),
                        _ => FieldPath::unresolvable(),
                    })
                    .collect(),
            ),
            _ => PathSpec::Invalid,
        }
    }

    /// Normalize to a non-empty ordered list; `None` means "empty result".
    pub fn normalize(&self) -> Option<Vec<FieldPath>> {
        match self {
            PathSpec::Single(path) => Some(vec![FieldPath::parse(path)]),
            PathSpec::Many(paths) if !paths.is_empty() => Some(paths.clone()),
            PathSpec::Many(_) | PathSpec::Invalid => None,
        }
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::Single(path.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        PathSpec::Single(path)
    }
}

impl From<&[&str]> for PathSpec {
    fn from(paths: &[&str]) -> Self {
        PathSpec::Many(paths.iter().map(|p| FieldPath::parse(p)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PathSpec {
    fn from(paths: [&str; N]) -> Self {
        PathSpec::from(&paths[..])
    }
}

impl From<Vec<&str>> for PathSpec {
    fn from(paths: Vec<&str>) -> Self {
        PathSpec::from(paths.as_slice())
    }
}

impl From<Vec<String>> for PathSpec {
    fn from(paths: Vec<String>) -> Self {
        PathSpec::Many(paths.iter().map(|p| FieldPath::parse(p)).collect())
    }
}

impl From<&[String]> for PathSpec {
    fn from(paths: &[String]) -> Self {
        PathSpec::Many(paths.iter().map(|p| FieldPath::parse(p)).collect())
    }
}

impl From<Vec<FieldPath>> for PathSpec {
    fn from(paths: Vec<FieldPath>) -> Self {
        PathSpec::Many(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_top_level() {
        let doc = json!({"name": "Alice", "age": 30});
        assert_eq!(resolve(&doc, "name"), Some(&json!("Alice")));
        assert_eq!(resolve(&doc, "missing"), None);
    }

    #[test]
    fn test_resolve_nested() {
        let doc = json!({"a": {"b": {"c": {"d": 42}}}});
        assert_eq!(resolve(&doc, "a.b.c.d"), Some(&json!(42)));
        assert_eq!(resolve(&doc, "a.b.x"), None);
        assert_eq!(resolve(&doc, "a.b"), Some(&json!({"c": {"d": 42}})));
    }

    #[test]
    fn test_null_leaf_is_present() {
        let doc = json!({"a": null});
        assert_eq!(resolve(&doc, "a"), Some(&Value::Null));
    }

    #[test]
    fn test_null_intermediate_is_absent() {
        let doc = json!({"a": null});
        assert_eq!(resolve(&doc, "a.b"), None);
    }

    #[test]
    fn test_scalar_intermediate_is_absent() {
        let doc = json!({"a": 5, "s": "text"});
        assert_eq!(resolve(&doc, "a.b"), None);
        assert_eq!(resolve(&doc, "s.length"), None);
    }

    #[test]
    fn test_array_index_segment() {
        let doc = json!({"items": [{"sku": "x1"}, {"sku": "x2"}]});
        assert_eq!(resolve(&doc, "items.1.sku"), Some(&json!("x2")));
        assert_eq!(resolve(&doc, "items.7.sku"), None);
        assert_eq!(resolve(&doc, "items.first"), None);
    }

    #[test]
    fn test_non_canonical_array_index_is_absent() {
        let doc = json!({"items": ["a", "b"]});
        assert_eq!(resolve(&doc, "items.0"), Some(&json!("a")));
        assert_eq!(resolve(&doc, "items.01"), None);
        assert_eq!(resolve(&doc, "items.00"), None);
        assert_eq!(resolve(&doc, "items.+1"), None);
        assert_eq!(resolve(&doc, "items.-1"), None);
        assert_eq!(resolve(&doc, "items. 1"), None);
        assert_eq!(resolve(&doc, "items.99999999999999999999999"), None);

        // Object keys are matched verbatim, so "01" still works there
        let doc = json!({"items": {"01": "x"}});
        assert_eq!(resolve(&doc, "items.01"), Some(&json!("x")));
    }

    #[test]
    fn test_empty_path_is_absent() {
        let doc = json!({"": 1});
        assert_eq!(resolve(&doc, ""), None);
        assert!(!FieldPath::parse("").is_resolvable());
    }

    #[test]
    fn test_non_object_document() {
        assert_eq!(resolve(&json!(7), "a"), None);
        assert_eq!(resolve(&json!(null), "a"), None);
    }

    #[test]
    fn test_keys_containing_dots_are_not_reachable_as_one_segment() {
        let doc = json!({"a.b": 1});
        assert_eq!(resolve(&doc, "a.b"), None);
    }

    #[test]
    fn test_path_spec_normalize() {
        assert_eq!(
            PathSpec::from("a.b").normalize(),
            Some(vec![FieldPath::parse("a.b")])
        );
        assert_eq!(PathSpec::from(Vec::<String>::new()).normalize(), None);
        assert_eq!(PathSpec::Invalid.normalize(), None);
        assert_eq!(
            PathSpec::from(["x", "y"]).normalize().map(|p| p.len()),
            Some(2)
        );
    }

    #[test]
    fn test_path_spec_from_json() {
        assert_eq!(PathSpec::from_json(&json!("a")), PathSpec::Single("a".into()));
        assert_eq!(PathSpec::from_json(&json!(5)), PathSpec::Invalid);
        assert_eq!(PathSpec::from_json(&json!({"a": 1})), PathSpec::Invalid);
        assert_eq!(PathSpec::from_json(&json!([])).normalize(), None);

        let spec = PathSpec::from_json(&json!(["a", 3, "b"]));
        let paths = spec.normalize().unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].is_resolvable());
        assert!(!paths[1].is_resolvable());
        assert_eq!(paths[2].as_str(), "b");
    }
}
