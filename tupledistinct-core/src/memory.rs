// tupledistinct-core/src/memory.rs
//! In-memory collection backend
//!
//! A small document collection kept in memory. It is the reference
//! implementation of [`CollectionBackend`]: it serves projected cursors for
//! the collection-level entry point and offers the plain single-field
//! `distinct` that distinct-tuple results are checked against.
//!
//! ```text
//! MemoryCollection
//!   ├── RwLock<Vec<Arc<Value>>>   (documents, insertion order)
//!   └── find(projection) → MemoryCursor (snapshot, projects lazily)
//! ```

use crate::document::{DocumentId, ID_FIELD};
use crate::entry::CollectionBackend;
use crate::error::{DistinctError, Result};
use crate::identity::canonical_string;
use crate::path::FieldPath;
use crate::projection::Projection;
use crate::source::DocumentSource;
use crate::log_debug;
use ahash::AHashSet;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// Result of insert_many operation
#[derive(Debug, Clone)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<DocumentId>,
    pub inserted_count: usize,
}

pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Arc<Value>>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryCollection {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Build a collection from a JSON array of documents
    pub fn from_json_array(name: impl Into<String>, docs: &Value) -> Result<Self> {
        let collection = MemoryCollection::new(name);
        let docs = docs.as_array().ok_or_else(|| {
            DistinctError::InvalidDocument(format!(
                "collection '{}' must be an array of documents",
                collection.name
            ))
        })?;
        collection.insert_many(docs.iter().cloned())?;
        Ok(collection)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert one document. Must be a JSON object; gets an ObjectId-style
    /// `_id` when it has none.
    pub fn insert_one(&self, doc: Value) -> Result<DocumentId> {
        let (id, doc) = Self::prepare(doc)?;
        self.documents.write().push(Arc::new(doc));
        Ok(id)
    }

    /// Insert several documents. Validation happens before anything is
    /// stored, so a bad document leaves the collection unchanged.
    pub fn insert_many<I>(&self, docs: I) -> Result<InsertManyResult>
    where
        I: IntoIterator<Item = Value>,
    {
        let prepared = docs
            .into_iter()
            .map(Self::prepare)
            .collect::<Result<Vec<_>>>()?;

        let mut inserted_ids = Vec::with_capacity(prepared.len());
        let mut documents = self.documents.write();
        for (id, doc) in prepared {
            inserted_ids.push(id);
            documents.push(Arc::new(doc));
        }
        log_debug!("'{}': inserted {} document(s)", self.name, inserted_ids.len());

        Ok(InsertManyResult {
            inserted_count: inserted_ids.len(),
            inserted_ids,
        })
    }

    fn prepare(doc: Value) -> Result<(DocumentId, Value)> {
        let Value::Object(mut map) = doc else {
            return Err(DistinctError::InvalidDocument(
                "Document must be an object".to_string(),
            ));
        };

        let id = match map.get(ID_FIELD) {
            Some(value) => DocumentId::from_value(value).ok_or_else(|| {
                DistinctError::InvalidDocument(format!("_id cannot be an array: {}", value))
            })?,
            None => {
                let id = DocumentId::new_object_id();
                map.insert(ID_FIELD.to_string(), id.to_value());
                id
            }
        };
        Ok((id, Value::Object(map)))
    }

    pub fn count_documents(&self) -> u64 {
        self.documents.read().len() as u64
    }

    /// Remove every document
    pub fn clear(&self) {
        self.documents.write().clear();
    }

    /// Cursor over a snapshot of the collection, projected lazily.
    /// Inserts after this call are not visible to the cursor.
    pub fn find(&self, projection: &Projection) -> MemoryCursor {
        let snapshot = self.documents.read().clone();
        MemoryCursor {
            documents: snapshot,
            projection: projection.clone(),
            position: 0,
        }
    }

    /// Plain single-field distinct, in first-seen order. Documents missing
    /// the field contribute nothing.
    pub fn distinct(&self, field: &str) -> Vec<Value> {
        let path = FieldPath::parse(field);
        let documents = self.documents.read();

        let mut seen_values: AHashSet<String> = AHashSet::new();
        let mut distinct_values = Vec::new();
        for doc in documents.iter() {
            if let Some(value) = path.resolve(doc) {
                if seen_values.insert(canonical_string(value)) {
                    distinct_values.push(value.clone());
                }
            }
        }
        distinct_values
    }
}

impl CollectionBackend for MemoryCollection {
    type Error = DistinctError;
    type Source<'a> = MemoryCursor where Self: 'a;

    fn find_projected(&self, projection: &Projection) -> Result<MemoryCursor> {
        Ok(self.find(projection))
    }
}

/// Forward-only cursor over a collection snapshot
pub struct MemoryCursor {
    documents: Vec<Arc<Value>>,
    projection: Projection,
    position: usize,
}

impl MemoryCursor {
    pub fn remaining(&self) -> usize {
        self.documents.len().saturating_sub(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.documents.len()
    }

    /// Fetch the next chunk of documents (up to `chunk_size`)
    pub fn next_chunk(&mut self, chunk_size: usize) -> Vec<Value> {
        let end = self.position.saturating_add(chunk_size).min(self.documents.len());
        let chunk = self.documents[self.position..end]
            .iter()
            .map(|doc| self.projection.apply(doc))
            .collect();
        self.position = end;
        chunk
    }
}

impl DocumentSource for MemoryCursor {
    type Error = DistinctError;

    fn next_document(&mut self) -> Result<Option<Value>> {
        let Some(doc) = self.documents.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(self.projection.apply(doc)))
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.remaining() as u64)
    }
}
