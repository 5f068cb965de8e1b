//! scalarlog-core: event-file writer with per-key step tracking.
//!
//! The central design principle: `Logger::log()` writes and flushes its record
//! before returning. There is no queue and no background thread, which keeps
//! a logger usable after `fork()`.

pub mod clock;
pub mod config;
pub mod derived;
pub mod error;
pub mod event_file;
pub mod logger;
pub mod models;
pub mod sink;
pub mod tracker;

pub use clock::{Clock, SystemClock};
pub use config::{LoggerConfig, Target, DEFAULT_LOG_DIR};
pub use derived::ListStatistics;
pub use error::{Result, ScalarLogError};
pub use event_file::{find_event_files, read_events, EventFileReader, EventFileWriter};
pub use logger::Logger;
pub use models::{Event, SummaryValue};
pub use sink::{EventSink, MemorySink};
