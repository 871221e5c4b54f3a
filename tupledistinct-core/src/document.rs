// tupledistinct-core/src/document.rs
use serde::{Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Name of the identifier field every stored document carries
pub const ID_FIELD: &str = "_id";

/// Extended-JSON wrapper key for ObjectIds in exported documents
const OID_KEY: &str = "$oid";

/// Document ID types
///
/// Untagged so it appears as a plain value inside documents: `{"_id": 2}`.
/// `Other` keeps any remaining `_id` shape (composite objects, floats,
/// booleans, null) verbatim.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    String(String),
    ObjectId(String),
    Other(Value),
}

impl DocumentId {
    /// Fresh ObjectId-style identifier (UUID v4)
    pub fn new_object_id() -> Self {
        DocumentId::ObjectId(Uuid::new_v4().to_string())
    }

    /// Read an `_id` value supplied by the caller. Arrays are not valid ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(_) => None,
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => DocumentId::Int(i),
                None => DocumentId::Other(value.clone()),
            }),
            Value::String(s) => Some(DocumentId::String(s.clone())),
            Value::Object(map) => match (map.len(), map.get(OID_KEY)) {
                (1, Some(Value::String(oid))) => Some(DocumentId::ObjectId(oid.clone())),
                _ => Some(DocumentId::Other(value.clone())),
            },
            _ => Some(DocumentId::Other(value.clone())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            DocumentId::Int(n) => Value::from(*n),
            DocumentId::String(s) | DocumentId::ObjectId(s) => Value::String(s.clone()),
            DocumentId::Other(value) => value.clone(),
        }
    }
}

/// One element of a value tuple: what a path produced for one document.
///
/// `Absent` means the path could not be walked; `Present(Value::Null)` means
/// the document stores an explicit null there.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Present(Value),
    Absent,
}

impl FieldValue {
    pub fn from_resolved(resolved: Option<&Value>) -> Self {
        match resolved {
            Some(value) => FieldValue::Present(value.clone()),
            None => FieldValue::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Present(value) => Some(value),
            FieldValue::Absent => None,
        }
    }

    /// JSON rendering; absent becomes `null` (the shell's `undefined`)
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Present(value) => value.clone(),
            FieldValue::Absent => Value::Null,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Present(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Present(value) => value.serialize(serializer),
            FieldValue::Absent => serializer.serialize_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_untagged_serialization() {
        assert_eq!(serde_json::to_value(DocumentId::Int(2)).unwrap(), json!(2));
        assert_eq!(
            serde_json::to_value(DocumentId::String("k".into())).unwrap(),
            json!("k")
        );
    }

    #[test]
    fn test_document_id_from_value() {
        assert_eq!(DocumentId::from_value(&json!(7)), Some(DocumentId::Int(7)));
        assert_eq!(
            DocumentId::from_value(&json!("abc")),
            Some(DocumentId::String("abc".into()))
        );
        assert_eq!(DocumentId::from_value(&json!([1])), None);
    }

    #[test]
    fn test_document_id_from_exported_and_composite_values() {
        assert_eq!(
            DocumentId::from_value(&json!({"$oid": "5f1d7f"})),
            Some(DocumentId::ObjectId("5f1d7f".into()))
        );

        let composite = json!({"region": "eu", "n": 1});
        let id = DocumentId::from_value(&composite).unwrap();
        assert_eq!(id, DocumentId::Other(composite.clone()));
        assert_eq!(id.to_value(), composite);

        // "$oid" next to other keys is just a composite id
        let mixed = json!({"$oid": "5f1d7f", "shard": 2});
        assert_eq!(DocumentId::from_value(&mixed), Some(DocumentId::Other(mixed.clone())));

        for other in [json!(1.5), json!(true), json!(null), json!(18_446_744_073_709_551_615u64)] {
            assert_eq!(DocumentId::from_value(&other), Some(DocumentId::Other(other.clone())));
        }
    }

    #[test]
    fn test_other_id_serializes_verbatim() {
        let id = DocumentId::Other(json!({"region": "eu"}));
        assert_eq!(serde_json::to_value(&id).unwrap(), json!({"region": "eu"}));
    }

    #[test]
    fn test_object_ids_are_unique() {
        assert_ne!(DocumentId::new_object_id(), DocumentId::new_object_id());
    }

    #[test]
    fn test_field_value_absent_vs_null() {
        let null = FieldValue::from_resolved(Some(&Value::Null));
        let absent = FieldValue::from_resolved(None);
        assert_ne!(null, absent);
        assert!(absent.is_absent());
        assert_eq!(null.as_value(), Some(&Value::Null));
        // Both render as null in JSON
        assert_eq!(null.to_json(), absent.to_json());
    }

    #[test]
    fn test_field_value_serialize() {
        let row = vec![FieldValue::from(json!(1)), FieldValue::Absent];
        assert_eq!(serde_json::to_string(&row).unwrap(), "[1,null]");
    }
}
