//! Per-key bookkeeping: step counters and last-seen values for rates.

use std::collections::HashMap;

use crate::error::{Result, ScalarLogError};

/// Monotonic per-key step counters.
///
/// A step is resolved in two phases so that a failed write does not consume
/// it: [`begin`](StepTracker::begin) picks the step (applying an explicit
/// reset immediately) and [`commit`](StepTracker::commit) advances the
/// counter once the record is on disk.
#[derive(Debug, Default, Clone)]
pub struct StepTracker {
    next: HashMap<String, i64>,
}

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the next record for `key` will use. An explicit step resets the
    /// counter to that value before it is used.
    ///
    /// A step with no successor (`i64::MAX`) is rejected with
    /// `InvalidArgument` and leaves the counter untouched.
    pub fn begin(&mut self, key: &str, explicit: Option<i64>) -> Result<i64> {
        let step = explicit.unwrap_or_else(|| self.peek(key));
        if step.checked_add(1).is_none() {
            return Err(ScalarLogError::InvalidArgument(format!(
                "step {step} for '{key}' cannot be advanced"
            )));
        }
        self.next.insert(key.to_string(), step);
        Ok(step)
    }

    /// Mark `step` as used for `key`; the next auto step is `step + 1`.
    pub fn commit(&mut self, key: &str, step: i64) {
        self.next.insert(key.to_string(), step.saturating_add(1));
    }

    /// The step an auto-numbered record for `key` would get.
    pub fn peek(&self, key: &str) -> i64 {
        self.next.get(key).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.next.clear();
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}

/// Last observed `(value, wall_time)` per key.
#[derive(Debug, Default, Clone)]
pub struct RateTracker {
    last: HashMap<String, (f64, f64)>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self, key: &str) -> Option<(f64, f64)> {
        self.last.get(key).copied()
    }

    pub fn update(&mut self, key: &str, value: f64, wall_time: f64) {
        self.last.insert(key.to_string(), (value, wall_time));
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}
