//! Periodic progress notifications for long scans.
//!
//! A reporter is owned by a single aggregation call. It only remembers when
//! it last emitted, so concurrent calls never share state; only the interval
//! comes from (possibly shared) settings.

use chrono::{DateTime, Local};
use std::fmt;
use std::time::{Duration, Instant};

/// Snapshot passed to a progress sink
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Documents pulled from the source so far
    pub processed: u64,
    /// Total documents, when the source knows it
    pub total: Option<u64>,
    /// Distinct tuples found so far
    pub distinct: usize,
    pub at: DateTime<Local>,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = match self.total {
            Some(total) => total.to_string(),
            None => "?".to_string(),
        };
        write!(
            f,
            "Processed {} of {} document(s) and found {} distinct items at {}",
            self.processed,
            total,
            self.distinct,
            self.at.format("%a %b %d %Y %H:%M:%S %z")
        )
    }
}

pub type ProgressSink = Box<dyn FnMut(&ProgressEvent) + Send>;

pub struct ProgressReporter {
    interval: Option<Duration>,
    last_tick: Instant,
    sink: Option<ProgressSink>,
    emitted: u64,
}

impl ProgressReporter {
    /// `interval_ms <= 0` disables reporting
    pub fn new(interval_ms: i64) -> Self {
        let interval = if interval_ms > 0 {
            Some(Duration::from_millis(interval_ms as u64))
        } else {
            None
        };
        ProgressReporter {
            interval,
            last_tick: Instant::now(),
            sink: None,
            emitted: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Route notifications to `sink` instead of stderr
    pub fn with_sink(mut self, sink: ProgressSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// Number of notifications emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Reset the clock; called when a scan starts
    pub fn restart(&mut self) {
        self.last_tick = Instant::now();
    }

    /// Emit a notification if more than the interval has passed since the
    /// last one. Returns whether one was emitted.
    pub fn report(&mut self, processed: u64, total: Option<u64>, distinct: usize) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };

        let now = Instant::now();
        if now.duration_since(self.last_tick) <= interval {
            return false;
        }
        self.last_tick = now;
        self.emitted += 1;

        let event = ProgressEvent {
            processed,
            total,
            distinct,
            at: Local::now(),
        };
        match self.sink.as_mut() {
            Some(sink) => sink(&event),
            None => eprintln!("{}", event),
        }
        true
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("interval", &self.interval)
            .field("emitted", &self.emitted)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread::sleep;

    fn capturing(interval_ms: i64) -> (ProgressReporter, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let reporter = ProgressReporter::new(interval_ms)
            .with_sink(Box::new(move |e: &ProgressEvent| sink_events.lock().push(e.clone())));
        (reporter, events)
    }

    #[test]
    fn test_non_positive_interval_disables() {
        for interval in [0, -5] {
            let (mut reporter, events) = capturing(interval);
            assert!(!reporter.is_enabled());
            sleep(Duration::from_millis(2));
            assert!(!reporter.report(1, Some(1), 1));
            assert!(events.lock().is_empty());
        }
    }

    #[test]
    fn test_reports_after_interval() {
        let (mut reporter, events) = capturing(1);
        sleep(Duration::from_millis(5));
        assert!(reporter.report(3, Some(10), 2));

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].processed, 3);
        assert_eq!(events[0].total, Some(10));
        assert_eq!(events[0].distinct, 2);
    }

    #[test]
    fn test_does_not_report_before_interval() {
        let (mut reporter, events) = capturing(60_000);
        assert!(!reporter.report(1, None, 1));
        assert!(!reporter.report(2, None, 1));
        assert_eq!(reporter.emitted(), 0);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_clock_resets_after_emit() {
        let (mut reporter, _events) = capturing(50);
        sleep(Duration::from_millis(60));
        assert!(reporter.report(1, None, 1));
        // Immediately afterwards the interval has not elapsed again
        assert!(!reporter.report(2, None, 1));
        assert_eq!(reporter.emitted(), 1);
    }

    #[test]
    fn test_event_display() {
        let event = ProgressEvent {
            processed: 5,
            total: None,
            distinct: 2,
            at: Local::now(),
        };
        let line = event.to_string();
        assert!(line.starts_with("Processed 5 of ? document(s) and found 2 distinct items at "));

        let event = ProgressEvent {
            total: Some(9),
            ..event
        };
        assert!(event.to_string().contains("of 9 document(s)"));
    }
}
