// tupledistinct-core/src/aggregation.rs
// Distinct-tuple aggregation: extract, deduplicate, count, keep first-seen order

use crate::document::FieldValue;
use crate::identity::TupleKey;
use crate::output::{shape, DistinctOutput};
use crate::path::{FieldPath, PathSpec};
use crate::progress::ProgressReporter;
use crate::source::DocumentSource;
use crate::{log_debug, log_trace, log_warn};
use ahash::AHashMap;
use serde_json::Value;

/// Accumulated record for one distinct tuple
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    values: Vec<FieldValue>,
    count: u64,
}

impl Group {
    fn new(values: Vec<FieldValue>) -> Self {
        Group { values, count: 1 }
    }

    pub fn with_count(values: Vec<FieldValue>, count: u64) -> Self {
        Group { values, count }
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_values(self) -> Vec<FieldValue> {
        self.values
    }
}

/// What happened to one document's tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Every path was absent; the document does not count
    Skipped,
    /// First sighting; a group was appended at this position
    NewGroup(usize),
    /// Known tuple; the group at this position was incremented
    Counted(usize),
}

/// Tuple identity → group, with groups stored in first-seen order.
///
/// Counts are always tracked; whether they are emitted is decided only when
/// the registry is shaped.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    index: AHashMap<TupleKey, usize>,
    groups: Vec<Group>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolved tuple (`None` = absent)
    pub fn observe(&mut self, resolved: &[Option<&Value>]) -> Observation {
        if resolved.iter().all(Option::is_none) {
            return Observation::Skipped;
        }

        let key = TupleKey::identify(resolved);
        if let Some(&position) = self.index.get(&key) {
            self.groups[position].count += 1;
            return Observation::Counted(position);
        }

        let position = self.groups.len();
        log_trace!("new group #{}: {}", position, key);
        self.groups.push(Group::new(
            resolved.iter().map(|v| FieldValue::from_resolved(*v)).collect(),
        ));
        self.index.insert(key, position);
        Observation::NewGroup(position)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}

/// Per-call state of one distinct-tuple scan.
///
/// Documents are pushed one at a time; `finish` shapes the result. Feeding
/// documents by hand is what [`run`](Self::run) does with a source.
#[derive(Debug)]
pub struct DistinctAggregator {
    paths: Vec<FieldPath>,
    registry: GroupRegistry,
    processed: u64,
    skipped: u64,
}

impl DistinctAggregator {
    pub fn new(paths: Vec<FieldPath>) -> Self {
        DistinctAggregator {
            paths,
            registry: GroupRegistry::new(),
            processed: 0,
            skipped: 0,
        }
    }

    pub fn arity(&self) -> usize {
        self.paths.len()
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Documents where every path was absent
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn distinct_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn push(&mut self, doc: &Value) -> Observation {
        let resolved: Vec<Option<&Value>> = self.paths.iter().map(|p| p.resolve(doc)).collect();
        let observation = self.registry.observe(&resolved);

        self.processed += 1;
        if observation == Observation::Skipped {
            self.skipped += 1;
        }
        observation
    }

    /// Drain `source` into the registry. Stops at the first source error and
    /// returns it unchanged.
    pub fn run<S: DocumentSource>(
        &mut self,
        source: &mut S,
        progress: &mut ProgressReporter,
    ) -> Result<(), S::Error> {
        let total = source.size_hint();
        progress.restart();

        loop {
            let doc = match source.next_document() {
                Ok(Some(doc)) => doc,
                Ok(None) => break,
                Err(e) => {
                    log_warn!(
                        "document source failed after {} document(s); discarding {} group(s)",
                        self.processed,
                        self.registry.len()
                    );
                    return Err(e);
                }
            };

            self.push(&doc);
            progress.report(self.processed, total, self.registry.len());
        }
        Ok(())
    }

    pub fn finish(self, with_count: bool) -> DistinctOutput {
        log_debug!(
            "distinct over {:?}: {} document(s), {} skipped, {} distinct",
            self.paths.iter().map(FieldPath::as_str).collect::<Vec<_>>(),
            self.processed,
            self.skipped,
            self.registry.len()
        );
        let arity = self.paths.len();
        shape(self.registry.into_groups(), arity, with_count)
    }
}

/// Distinct combinations of `paths` across every document of `source`.
///
/// An empty or malformed `paths` gives an empty result without reading the
/// source. Source errors are returned as-is and no partial result is kept.
pub fn distinct_tuple<S: DocumentSource>(
    source: &mut S,
    paths: &PathSpec,
    with_count: bool,
    progress: &mut ProgressReporter,
) -> Result<DistinctOutput, S::Error> {
    let Some(paths) = paths.normalize() else {
        log_debug!("distinct request without usable paths: {:?}", paths);
        return Ok(shape(Vec::new(), 0, with_count));
    };

    let mut aggregator = DistinctAggregator::new(paths);
    aggregator.run(source, progress)?;
    Ok(aggregator.finish(with_count))
}
