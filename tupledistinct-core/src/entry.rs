// tupledistinct-core/src/entry.rs
//! The two public entry points.
//!
//! - [`Cursor`] wraps any [`DocumentSource`] (a query result, a file, an
//!   iterator) and runs the aggregation over it.
//! - [`Collection`] wraps a [`CollectionBackend`]; it asks the backend for a
//!   cursor projected down to the requested paths and hands that to the
//!   same aggregation.
//!
//! Both take a snapshot of the process-wide [`DistinctSettings`] when they
//! are built; `with_settings` replaces it for that wrapper only.

use crate::aggregation::distinct_tuple;
use crate::config::{self, DistinctSettings, EntryPoint};
use crate::output::DistinctOutput;
use crate::path::PathSpec;
use crate::progress::{ProgressEvent, ProgressReporter, ProgressSink};
use crate::projection::Projection;
use crate::source::DocumentSource;
use crate::log_debug;
use std::sync::Arc;

/// A document store's collection, as seen by the collection entry point.
///
/// `find_projected` must return every document of the collection; the
/// projection only limits which fields are fetched.
pub trait CollectionBackend {
    type Error;
    type Source<'a>: DocumentSource<Error = Self::Error>
    where
        Self: 'a;

    fn find_projected(&self, projection: &Projection) -> Result<Self::Source<'_>, Self::Error>;
}

/// Cursor-level entry point. Consumed by the call, like the source it wraps.
pub struct Cursor<S> {
    source: S,
    settings: DistinctSettings,
    sink: Option<ProgressSink>,
}

impl<S: DocumentSource> Cursor<S> {
    pub fn new(source: S) -> Self {
        Cursor {
            source,
            settings: config::settings(),
            sink: None,
        }
    }

    pub fn with_settings(mut self, settings: DistinctSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_progress_sink<F>(mut self, sink: F) -> Self
    where
        F: FnMut(&ProgressEvent) + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn settings(&self) -> &DistinctSettings {
        &self.settings
    }

    /// Distinct combinations of `paths`, optionally with counts.
    ///
    /// A single path without counts gives a flat list; anything else gives
    /// tuples. Malformed `paths` give an empty result.
    pub fn distinct_tuple(
        mut self,
        paths: impl Into<PathSpec>,
        with_count: bool,
    ) -> Result<DistinctOutput, S::Error> {
        let mut progress = reporter(&self.settings, EntryPoint::Cursor, self.sink.take());
        distinct_tuple(&mut self.source, &paths.into(), with_count, &mut progress)
    }
}

type SharedSink = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Collection-level entry point
pub struct Collection<B> {
    backend: B,
    settings: DistinctSettings,
    sink: Option<SharedSink>,
}

impl<B: CollectionBackend> Collection<B> {
    pub fn new(backend: B) -> Self {
        Collection {
            backend,
            settings: config::settings(),
            sink: None,
        }
    }

    pub fn with_settings(mut self, settings: DistinctSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_progress_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn settings(&self) -> &DistinctSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Same contract as [`Cursor::distinct_tuple`], over the whole
    /// collection. Only the requested fields are fetched; `_id` is left out
    /// unless it is one of the paths.
    pub fn distinct_tuple(
        &self,
        paths: impl Into<PathSpec>,
        with_count: bool,
    ) -> Result<DistinctOutput, B::Error> {
        let paths = paths.into();
        if paths.normalize().is_none() {
            log_debug!("distinct request without usable paths: {:?}", paths);
            return Ok(DistinctOutput::Tuples(Vec::new()));
        }

        let projection = Projection::for_paths(&paths);
        let mut source = self.backend.find_projected(&projection)?;

        let sink = self.sink.clone().map(|shared| -> ProgressSink {
            Box::new(move |event: &ProgressEvent| shared(event))
        });
        let mut progress = reporter(&self.settings, EntryPoint::Collection, sink);
        distinct_tuple(&mut source, &paths, with_count, &mut progress)
    }
}

fn reporter(
    settings: &DistinctSettings,
    entry: EntryPoint,
    sink: Option<ProgressSink>,
) -> ProgressReporter {
    let reporter = ProgressReporter::new(settings.interval_for(entry));
    match sink {
        Some(sink) => reporter.with_sink(sink),
        None => reporter,
    }
}
