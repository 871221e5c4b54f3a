// tupledistinct-core/src/lib.rs
// Multi-key distinct aggregation over document streams - pure Rust, no bindings

pub mod aggregation;
pub mod config;
pub mod document;
pub mod entry;
pub mod error;
pub mod identity;
pub mod logging;
pub mod memory;
pub mod output;
pub mod path;
pub mod progress;
pub mod projection;
pub mod source;

// Public exports
pub use aggregation::{distinct_tuple, DistinctAggregator, Group, GroupRegistry, Observation};
pub use config::{
    replace_settings, reset_settings, set_collection_status_interval,
    set_cursor_status_interval, set_status_interval, settings, DistinctSettings, EntryPoint,
    DEFAULT_STATUS_INTERVAL_MS,
};
pub use document::{DocumentId, FieldValue, ID_FIELD};
pub use entry::{Collection, CollectionBackend, Cursor};
pub use error::{DistinctError, Result};
pub use identity::TupleKey;
pub use logging::{get_log_level, set_log_level, LogLevel};
pub use memory::{InsertManyResult, MemoryCollection, MemoryCursor};
pub use output::{DistinctOutput, DistinctRow};
pub use path::{FieldPath, PathSpec};
pub use progress::{ProgressEvent, ProgressReporter};
pub use projection::Projection;
pub use source::{DocumentSource, FallibleSource, IterSource, JsonLinesSource};
