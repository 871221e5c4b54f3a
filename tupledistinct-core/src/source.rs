// tupledistinct-core/src/source.rs
//! Document sources: the pull-based input of a distinct-tuple scan.
//!
//! A source is forward-only and cannot be restarted. It yields
//! `Ok(Some(doc))` per document, `Ok(None)` once exhausted (or cut short by
//! the caller) and `Err(_)` on failure. The engine stops at the first error
//! and hands it back unchanged.

use crate::error::{DistinctError, Result};
use serde_json::Value;
use std::convert::Infallible;
use std::io::BufRead;

pub trait DocumentSource {
    type Error;

    /// Produce the next document, or `None` when exhausted
    fn next_document(&mut self) -> std::result::Result<Option<Value>, Self::Error>;

    /// Total number of documents, if known up front. Only used for progress output.
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &mut S {
    type Error = S::Error;

    fn next_document(&mut self) -> std::result::Result<Option<Value>, Self::Error> {
        (**self).next_document()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    type Error = S::Error;

    fn next_document(&mut self) -> std::result::Result<Option<Value>, Self::Error> {
        (**self).next_document()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

/// Wraps an infallible iterator of documents
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = Value>> IterSource<I> {
    pub fn new<T: IntoIterator<IntoIter = I>>(docs: T) -> Self {
        IterSource {
            iter: docs.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Value>> DocumentSource for IterSource<I> {
    type Error = Infallible;

    fn next_document(&mut self) -> std::result::Result<Option<Value>, Infallible> {
        Ok(self.iter.next())
    }

    fn size_hint(&self) -> Option<u64> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower as u64),
            _ => None,
        }
    }
}

/// Wraps an iterator of `Result`s; the first `Err` ends the scan
#[derive(Debug, Clone)]
pub struct FallibleSource<I> {
    iter: I,
}

impl<I, E> FallibleSource<I>
where
    I: Iterator<Item = std::result::Result<Value, E>>,
{
    pub fn new<T: IntoIterator<IntoIter = I>>(docs: T) -> Self {
        FallibleSource {
            iter: docs.into_iter(),
        }
    }
}

impl<I, E> DocumentSource for FallibleSource<I>
where
    I: Iterator<Item = std::result::Result<Value, E>>,
{
    type Error = E;

    fn next_document(&mut self) -> std::result::Result<Option<Value>, E> {
        self.iter.next().transpose()
    }
}

/// Streams newline-delimited JSON. Blank lines are skipped.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }

    /// 1-based number of the last line read
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl<R: BufRead> DocumentSource for JsonLinesSource<R> {
    type Error = DistinctError;

    fn next_document(&mut self) -> Result<Option<Value>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed).map(Some).map_err(|e| {
                DistinctError::Serialization(format!("line {}: {}", self.line_number, e))
            });
        }
    }
}
