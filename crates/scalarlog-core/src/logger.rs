//! The scalar logger: step assignment, record construction and flushing.
//!
//! Every `log()` call is written and flushed before it returns. Nothing is
//! queued and no background thread is involved, so a `Logger` keeps working
//! in a process forked after it was created.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::{LoggerConfig, Target};
use crate::error::{Result, ScalarLogError};
use crate::event_file::EventFileWriter;
use crate::models::SummaryValue;
use crate::sink::EventSink;
use crate::tracker::{RateTracker, StepTracker};

/// The sink a logger currently writes to.
struct ActiveSink {
    sink: Box<dyn EventSink>,
    /// Path of the event file when the logger opened it itself.
    event_file: Option<PathBuf>,
}

impl ActiveSink {
    fn open(dir: &Path, suffix: &str) -> Result<Self> {
        let writer = EventFileWriter::create_with_suffix(dir, suffix)?;
        Ok(Self {
            event_file: Some(writer.path().to_path_buf()),
            sink: Box::new(writer),
        })
    }

    fn adopt(sink: Box<dyn EventSink>) -> Self {
        Self {
            sink,
            event_file: None,
        }
    }

    fn is_owned(&self) -> bool {
        self.event_file.is_some()
    }
}

/// Writes named scalars with independent per-key step counters.
///
/// A logger is single-threaded: it does no locking of its own, so sharing
/// one between threads needs a `Mutex` around it.
pub struct Logger {
    active: Option<ActiveSink>,
    pub(crate) steps: StepTracker,
    pub(crate) rates: RateTracker,
    pub(crate) clock: Box<dyn Clock>,
}

impl Logger {
    pub fn new(target: Target) -> Result<Self> {
        let active = match target {
            Target::Directory(dir) => ActiveSink::open(&dir, "")?,
            Target::Sink(sink) => ActiveSink::adopt(sink),
        };
        Ok(Self::from_active(active))
    }

    fn from_active(active: ActiveSink) -> Self {
        Self {
            active: Some(active),
            steps: StepTracker::new(),
            rates: RateTracker::new(),
            clock: Box::new(SystemClock),
        }
    }

    /// Open a fresh event file in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(Target::Directory(dir.into()))
    }

    /// Write into a caller-owned sink. The logger never closes it.
    pub fn with_sink(sink: impl EventSink + 'static) -> Result<Self> {
        Self::new(Target::sink(sink))
    }

    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let active = ActiveSink::open(&config.log_dir, &config.filename_suffix)?;
        Ok(Self::from_active(active))
    }

    /// Replace the wall-clock source used for timestamps and rates.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Point this logger at a fresh event file in `dir`.
    ///
    /// Step and rate state start over. The previous sink is dropped without
    /// being closed. If the new file cannot be opened the logger is left as
    /// it was.
    pub fn configure_target(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let active = ActiveSink::open(dir.as_ref(), "")?;
        self.retarget(active);
        Ok(())
    }

    /// Point this logger at a caller-owned sink, resetting step and rate state.
    pub fn adopt_sink(&mut self, sink: impl EventSink + 'static) {
        self.retarget(ActiveSink::adopt(Box::new(sink)));
    }

    fn retarget(&mut self, active: ActiveSink) {
        self.active = Some(active);
        self.steps.clear();
        self.rates.clear();
    }

    /// Record `value` under `key`.
    ///
    /// Without `step` the key's counter supplies the step (0 on first use).
    /// With `step` the counter is reset to it first. Either way the counter
    /// ends one past the step written. The record is flushed before
    /// returning; on a write failure the auto counter does not advance.
    /// `i64::MAX` is not a usable step and fails with `InvalidArgument`
    /// before anything is written.
    pub fn log(&mut self, key: &str, value: f64, step: Option<i64>) -> Result<()> {
        let wall_time = self.clock.now();
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| ScalarLogError::InvalidState("logger is closed".into()))?;

        let step = self.steps.begin(key, step)?;
        let record = SummaryValue::new(key, value, wall_time, step);
        active.sink.append(&record.to_event())?;
        active.sink.flush()?;
        self.steps.commit(key, step);

        debug!(key, step, value, "Scalar logged");
        Ok(())
    }

    /// Flush and release the sink. A self-opened event file is closed; an
    /// adopted sink is only flushed. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        if active.is_owned() {
            active.sink.close()?;
        } else {
            active.sink.flush()?;
        }
        info!(
            event_file = ?active.event_file,
            "Logger closed"
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.active.is_none()
    }

    /// Path of the event file, if this logger opened one itself.
    pub fn event_file(&self) -> Option<&Path> {
        self.active.as_ref()?.event_file.as_deref()
    }

    /// The step the next auto-numbered record for `key` will get.
    pub fn next_step(&self, key: &str) -> i64 {
        self.steps.peek(key)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("event_file", &self.event_file())
            .field("closed", &self.is_closed())
            .field("keys", &self.steps.len())
            .finish()
    }
}
