//! Wall-clock source for record timestamps and rate measurement.

use chrono::{DateTime, Utc};

/// Seconds since the Unix epoch, with sub-second precision.
pub trait Clock: Send {
    fn now(&self) -> f64;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        to_unix_secs(Utc::now())
    }
}

impl<F> Clock for F
where
    F: Fn() -> f64 + Send,
{
    fn now(&self) -> f64 {
        self()
    }
}

pub fn to_unix_secs(t: DateTime<Utc>) -> f64 {
    t.timestamp_micros() as f64 / 1_000_000.0
}
