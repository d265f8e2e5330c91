//! Rolling lag buffer feeding lag features during a forecast run

use crate::{LagError, Result};
use std::collections::VecDeque;

/// Fixed-capacity rolling window over a target series, most recent last.
///
/// Values are only ever appended in chronological order; once the buffer is
/// full each push evicts the oldest value. Nothing already in the buffer is
/// rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct LagBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl LagBuffer {
    /// Create an empty buffer with the given capacity
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(LagError::InvalidInput(
                "Buffer capacity must be positive".to_string(),
            ));
        }

        Ok(Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Create a full buffer seeded from the tail of `history`
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity, normally the largest lag
    /// * `history` - Observed values in chronological order
    pub fn seeded(capacity: usize, history: &[f64]) -> Result<Self> {
        let mut buffer = Self::new(capacity)?;
        if history.len() < capacity {
            return Err(LagError::InsufficientData(format!(
                "Need at least {} observations to seed the lag buffer, got {}",
                capacity,
                history.len()
            )));
        }

        for &value in &history[history.len() - capacity..] {
            buffer.push(value);
        }

        Ok(buffer)
    }

    /// Value `steps_back` positions from the end; `value_at(1)` is the latest
    pub fn value_at(&self, steps_back: usize) -> Result<f64> {
        let len = self.values.len();
        if steps_back == 0 || steps_back > len {
            return Err(LagError::OutOfRange { steps_back, len });
        }

        Ok(self.values[len - steps_back])
    }

    /// Append a value, discarding the oldest one when at capacity
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Most recent value, if any
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Current number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if the buffer holds `capacity` values
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    /// Maximum number of values retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// Copy the contents, oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
