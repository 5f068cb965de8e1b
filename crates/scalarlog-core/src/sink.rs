//! The append-only sink contract a `Logger` writes through.

use std::sync::{Arc, Mutex};

use crate::error::{Result, ScalarLogError};
use crate::models::Event;

/// An append-only destination for event records.
///
/// The logger calls [`append`](EventSink::append) followed by
/// [`flush`](EventSink::flush) on every record. It calls
/// [`close`](EventSink::close) only on sinks it opened itself.
pub trait EventSink: Send {
    fn append(&mut self, event: &Event) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn append(&mut self, event: &Event) -> Result<()> {
        (**self).append(event)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A shared sink lets a caller keep writing its own events while a logger
/// appends to the same stream. Each call holds the lock only for its own
/// record, so records never interleave mid-frame.
impl<S: EventSink> EventSink for Arc<Mutex<S>> {
    fn append(&mut self, event: &Event) -> Result<()> {
        lock(self)?.append(event)
    }

    fn flush(&mut self) -> Result<()> {
        lock(self)?.flush()
    }

    fn close(&mut self) -> Result<()> {
        lock(self)?.close()
    }
}

fn lock<S>(shared: &Mutex<S>) -> Result<std::sync::MutexGuard<'_, S>> {
    shared
        .lock()
        .map_err(|_| ScalarLogError::InvalidState("shared sink lock poisoned".into()))
}

/// In-memory sink that keeps every record. Handy for host programs that
/// want to inspect what would have been written.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub events: Vec<Event>,
    pub flushes: usize,
    pub closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the `(tag, value, step)` triples recorded so far.
    pub fn scalars(&self) -> Vec<(String, f32, i64)> {
        self.events
            .iter()
            .flat_map(|e| e.scalars().map(move |(tag, v)| (tag.to_string(), v, e.step)))
            .collect()
    }
}

impl EventSink for MemorySink {
    fn append(&mut self, event: &Event) -> Result<()> {
        if self.closed {
            return Err(ScalarLogError::InvalidState("sink is closed".into()));
        }
        self.events.push(event.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
