//! Derived metrics layered on top of [`Logger::log`].

use tracing::warn;

use crate::error::{Result, ScalarLogError};
use crate::logger::Logger;

/// Summary statistics of a list of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl ListStatistics {
    /// `None` for an empty slice, where mean and deviation are undefined.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
        })
    }
}

impl Logger {
    /// Log min, max, mean and population std of `values` under
    /// `<key>_min`, `<key>_max`, `<key>_avg` and `<key>_std`, each on its own
    /// step counter.
    ///
    /// The four records are written one after another. If one fails, the
    /// ones before it stay written with their counters advanced and the rest
    /// are skipped.
    pub fn log_list_statistics(&mut self, key: &str, values: &[f64]) -> Result<()> {
        let stats = ListStatistics::compute(values).ok_or_else(|| {
            ScalarLogError::InvalidArgument(format!(
                "cannot compute statistics of an empty list for '{key}'"
            ))
        })?;
        self.log(&format!("{key}_min"), stats.min, None)?;
        self.log(&format!("{key}_max"), stats.max, None)?;
        self.log(&format!("{key}_avg"), stats.mean, None)?;
        self.log(&format!("{key}_std"), stats.std, None)?;
        Ok(())
    }

    /// Log the rate of change of `value` since the previous call for `key`,
    /// as `<key>_rate`, in units per second.
    ///
    /// The first call for a key only remembers the value. A call on which
    /// the clock has not advanced fails with `InvalidState` and leaves the
    /// remembered value alone. So does any call on a closed logger.
    pub fn measure_rate(&mut self, key: &str, value: f64) -> Result<()> {
        if self.is_closed() {
            return Err(ScalarLogError::InvalidState("logger is closed".into()));
        }
        let now = self.clock.now();
        let Some((last_value, last_time)) = self.rates.last(key) else {
            self.rates.update(key, value, now);
            return Ok(());
        };

        let elapsed = now - last_time;
        if elapsed <= 0.0 {
            warn!(key, elapsed, "Rate measurement rejected: clock did not advance");
            return Err(ScalarLogError::InvalidState(format!(
                "no time elapsed since the last rate measurement for '{key}'"
            )));
        }

        self.log(&format!("{key}_rate"), (value - last_value) / elapsed, None)?;
        self.rates.update(key, value, now);
        Ok(())
    }
}
