//! Tuple identity keys
//!
//! Two value tuples are "the same combination" iff their [`TupleKey`]s are
//! equal. The key is a canonical, type-tagged encoding of the tuple:
//!
//! - every value carries a one-letter type tag, so `1` and `"1"` differ
//! - strings and object keys are length-prefixed, so no content can be
//!   mistaken for a separator
//! - object keys are written in sorted order, so `{"a":1,"b":2}` and
//!   `{"b":2,"a":1}` encode identically
//! - numbers are compared by numeric value (`1` and `1.0` are one key)
//! - absent has its own tag, distinct from `null`
//!
//! Positions are part of the encoding, so `(1, absent)` and `(absent, 1)`
//! never collide.

use crate::document::FieldValue;
use serde_json::{Number, Value};
use std::fmt;

/// 2^63 and 2^64: integral floats in `[-2^63, 2^63)` fit an i64, `[0, 2^64)` a u64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Canonical identity of one value tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleKey(String);

impl TupleKey {
    /// Build the key for a tuple of resolved values (`None` = absent)
    pub fn identify(values: &[Option<&Value>]) -> Self {
        let mut out = String::with_capacity(16 * values.len());
        out.push_str(&values.len().to_string());
        out.push('|');
        for value in values {
            match value {
                Some(value) => encode_value(&mut out, value),
                None => out.push('_'),
            }
        }
        TupleKey(out)
    }

    pub fn from_field_values(values: &[FieldValue]) -> Self {
        let resolved: Vec<Option<&Value>> = values.iter().map(FieldValue::as_value).collect();
        TupleKey::identify(&resolved)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TupleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical type-tagged encoding of a single value
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    encode_value(&mut out, value);
    out
}

fn encode_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push('Z'),
        Value::Bool(true) => out.push('T'),
        Value::Bool(false) => out.push('F'),
        Value::Number(n) => encode_number(out, n),
        Value::String(s) => {
            out.push('S');
            encode_str(out, s);
        }
        Value::Array(items) => {
            out.push('A');
            out.push_str(&items.len().to_string());
            out.push('[');
            for item in items {
                encode_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));

            out.push('O');
            out.push_str(&pairs.len().to_string());
            out.push('{');
            for (key, value) in pairs {
                encode_str(out, key);
                encode_value(out, value);
            }
            out.push('}');
        }
    }
}

fn encode_str(out: &mut String, s: &str) {
    out.push_str(&s.len().to_string());
    out.push(':');
    out.push_str(s);
}

fn encode_number(out: &mut String, n: &Number) {
    out.push('N');
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        // Integral floats share the integer encoding; `as` also folds -0.0 into 0
        if f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
            out.push_str(&(f as i64).to_string());
        } else if f.fract() == 0.0 && f >= 0.0 && f < U64_BOUND {
            out.push_str(&(f as u64).to_string());
        } else {
            out.push_str(&format!("{:?}", f));
        }
    }
    out.push(';');
}
