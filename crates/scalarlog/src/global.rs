//! Process-wide default logger for the free-function API.
//!
//! The default is created lazily in [`DEFAULT_LOG_DIR`] the first time
//! [`record`] runs without prior configuration. Reconfiguring replaces the
//! default outright: the previous logger is dropped without being closed.
//! Its records are already flushed, but call [`close_default`] first when the
//! previous sink needs an explicit close.
//!
//! Calls into this module from inside a [`with_default`] closure on the same
//! thread fail with `InvalidState` instead of blocking on the held lock.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use scalarlog_core::{
    EventSink, Logger, LoggerConfig, Result, ScalarLogError, Target, DEFAULT_LOG_DIR,
};

static DEFAULT: Mutex<Option<Logger>> = Mutex::new(None);

thread_local! {
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

/// Clears the callback flag when the `with_default` closure returns or unwinds.
struct CallbackGuard;

impl CallbackGuard {
    fn enter() -> Self {
        IN_CALLBACK.with(|flag| flag.set(true));
        CallbackGuard
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        IN_CALLBACK.with(|flag| flag.set(false));
    }
}

fn slot() -> Result<MutexGuard<'static, Option<Logger>>> {
    if IN_CALLBACK.with(Cell::get) {
        return Err(ScalarLogError::InvalidState(
            "default logger is already in use by this thread".into(),
        ));
    }
    Ok(DEFAULT.lock().unwrap_or_else(PoisonError::into_inner))
}

fn install(logger: Logger) -> Result<()> {
    let mut slot = slot()?;
    if let Some(previous) = slot.replace(logger) {
        if !previous.is_closed() {
            warn!(
                event_file = ?previous.event_file(),
                "Default logger replaced without close; previous sink abandoned"
            );
        }
    }
    Ok(())
}

/// Make a fresh logger writing into `dir` the default.
pub fn configure_default_target(dir: impl AsRef<Path>) -> Result<()> {
    let logger = Logger::open(dir.as_ref().to_path_buf())?;
    install(logger)
}

/// Make a fresh logger writing into a caller-owned sink the default.
pub fn configure_default_sink(sink: impl EventSink + 'static) -> Result<()> {
    install(Logger::with_sink(sink)?)
}

/// Make a fresh logger for `target` the default.
pub fn configure_default(target: Target) -> Result<()> {
    install(Logger::new(target)?)
}

/// Log through the default logger, creating it in `./logs` on first use.
pub fn record(key: &str, value: f64, step: Option<i64>) -> Result<()> {
    with_default(|logger| logger.log(key, value, step))
}

/// Run `f` against the default logger, creating it in `./logs` on first use.
///
/// The default stays locked while `f` runs. Use the `&mut Logger` it is
/// given; calling [`record`] or the `configure_default_*` functions from
/// inside `f` returns `InvalidState`.
pub fn with_default<T>(f: impl FnOnce(&mut Logger) -> Result<T>) -> Result<T> {
    let mut slot = slot()?;
    if slot.is_none() {
        *slot = Some(Logger::from_config(&LoggerConfig::default())?);
        info!(dir = DEFAULT_LOG_DIR, "Default logger created");
    }
    let logger = slot
        .as_mut()
        .ok_or_else(|| ScalarLogError::InvalidState("default logger unavailable".into()))?;
    let _callback = CallbackGuard::enter();
    f(logger)
}

/// Close the default logger. Later [`record`] calls fail until the default is
/// reconfigured.
pub fn close_default() -> Result<()> {
    match slot()?.as_mut() {
        Some(logger) => logger.close(),
        None => Ok(()),
    }
}

/// Event file of the default logger, if one is configured and self-opened.
pub fn default_event_file() -> Option<PathBuf> {
    slot().ok()?.as_ref()?.event_file().map(Path::to_path_buf)
}
