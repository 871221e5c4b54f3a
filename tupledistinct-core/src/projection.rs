// tupledistinct-core/src/projection.rs
// Field projection used by the collection entry point to fetch only the requested paths

use crate::document::ID_FIELD;
use crate::path::{FieldPath, PathSpec};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Projection: field → 1 (include) or 0 (exclude).
/// `_id` may be excluded in include mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: HashMap<String, i32>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, field: &str) -> Self {
        self.fields.insert(field.to_string(), 1);
        self
    }

    pub fn exclude(mut self, field: &str) -> Self {
        self.fields.insert(field.to_string(), 0);
        self
    }

    /// Minimal projection for a distinct-tuple request.
    ///
    /// Every resolvable path is included. `_id` is fetched only when one of
    /// the paths starts at it; otherwise it is excluded explicitly.
    pub fn for_paths(paths: &PathSpec) -> Self {
        let mut projection = Projection::new();
        let Some(paths) = paths.normalize() else {
            return projection;
        };

        let mut wants_id = false;
        for path in paths.iter().filter(|p| p.is_resolvable()) {
            if path.segments()[0] == ID_FIELD {
                wants_id = true;
            }
            projection.fields.insert(path.as_str().to_string(), 1);
        }
        if !wants_id {
            projection.fields.insert(ID_FIELD.to_string(), 0);
        }
        projection
    }

    pub fn get(&self, field: &str) -> Option<i32> {
        self.fields.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Include mode: at least one inclusion and no exclusions besides `_id`
    pub fn is_include_mode(&self) -> bool {
        let has_inclusions = self.fields.values().any(|&v| v == 1);
        let has_non_id_exclusions = self
            .fields
            .iter()
            .any(|(field, &action)| action == 0 && field != ID_FIELD);
        has_inclusions && !has_non_id_exclusions
    }

    /// Apply to one document.
    ///
    /// Included dotted fields are rebuilt as nested objects, so a projected
    /// document resolves every included path to the same value as the
    /// original. Exclusions only apply to top-level fields.
    pub fn apply(&self, doc: &Value) -> Value {
        if self.fields.is_empty() {
            return doc.clone();
        }
        let Value::Object(obj) = doc else {
            return doc.clone();
        };

        let mut result = Map::new();
        if self.is_include_mode() {
            // Shorter paths first so a parent never overwrites a child already copied
            let mut included: Vec<&String> = self
                .fields
                .iter()
                .filter(|(_, action)| **action == 1)
                .map(|(field, _)| field)
                .collect();
            included.sort_by_key(|field| field.len());

            for field in included {
                if let Some(value) = FieldPath::parse(field).resolve(doc) {
                    set_nested_value(&mut result, field, value.clone());
                }
            }

            if self.get(ID_FIELD) != Some(0) {
                if let Some(id) = obj.get(ID_FIELD) {
                    result.insert(ID_FIELD.to_string(), id.clone());
                }
            }
        } else {
            for (key, value) in obj {
                if self.get(key) != Some(0) {
                    result.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Object(result)
    }
}

/// Set `value` at a dotted path, creating intermediate objects as needed.
/// Stops silently when an existing intermediate is not an object.
fn set_nested_value(target: &mut Map<String, Value>, path: &str, value: Value) {
    let mut parts = path.split('.').peekable();
    let mut current = target;

    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return;
        }

        let next = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match next {
            Value::Object(map) => current = map,
            _ => return,
        }
    }
}
