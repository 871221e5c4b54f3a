// tupledistinct-core/src/output.rs
// Result shaping: flat values, tuples, or tuples with a trailing count

use crate::aggregation::Group;
use crate::document::FieldValue;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One output tuple: the group's values in requested path order, plus the
/// occurrence count when counting was requested
#[derive(Debug, Clone, PartialEq)]
pub struct DistinctRow {
    pub values: Vec<FieldValue>,
    pub count: Option<u64>,
}

impl DistinctRow {
    /// `[v1, v2, ..., count?]` with absent rendered as `null`
    pub fn to_json(&self) -> Value {
        let mut items: Vec<Value> = self.values.iter().map(FieldValue::to_json).collect();
        if let Some(count) = self.count {
            items.push(Value::from(count));
        }
        Value::Array(items)
    }
}

impl Serialize for DistinctRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.values.len() + usize::from(self.count.is_some());
        let mut seq = serializer.serialize_seq(Some(len))?;
        for value in &self.values {
            seq.serialize_element(value)?;
        }
        if let Some(count) = self.count {
            seq.serialize_element(&count)?;
        }
        seq.end()
    }
}

/// Result of a distinct-tuple call, in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub enum DistinctOutput {
    /// Single path without counts: behaves like a plain `distinct`
    Values(Vec<Value>),
    /// Multiple paths, or any request with counts
    Tuples(Vec<DistinctRow>),
}

impl DistinctOutput {
    pub fn len(&self) -> usize {
        match self {
            DistinctOutput::Values(values) => values.len(),
            DistinctOutput::Tuples(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_values(&self) -> Option<&[Value]> {
        match self {
            DistinctOutput::Values(values) => Some(values),
            DistinctOutput::Tuples(_) => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[DistinctRow]> {
        match self {
            DistinctOutput::Values(_) => None,
            DistinctOutput::Tuples(rows) => Some(rows),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DistinctOutput::Values(values) => Value::Array(values.clone()),
            DistinctOutput::Tuples(rows) => Value::Array(rows.iter().map(DistinctRow::to_json).collect()),
        }
    }
}

impl Serialize for DistinctOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DistinctOutput::Values(values) => values.serialize(serializer),
            DistinctOutput::Tuples(rows) => rows.serialize(serializer),
        }
    }
}

/// Turn accumulated groups into the requested shape.
///
/// - `arity == 1 && !with_count`: flat list of the single value
/// - `with_count`: tuples with the count appended
/// - otherwise: bare tuples
pub fn shape(groups: Vec<Group>, arity: usize, with_count: bool) -> DistinctOutput {
    if arity == 1 && !with_count {
        return DistinctOutput::Values(
            groups
                .into_iter()
                // Single-path groups only exist for present values; Null is unreachable
                .map(|group| match group.into_values().into_iter().next() {
                    Some(FieldValue::Present(value)) => value,
                    _ => Value::Null,
                })
                .collect(),
        );
    }

    DistinctOutput::Tuples(
        groups
            .into_iter()
            .map(|group| {
                let count = with_count.then(|| group.count());
                DistinctRow {
                    values: group.into_values(),
                    count,
                }
            })
            .collect(),
    )
}
