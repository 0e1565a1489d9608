//! Time-based waiting.
use std::fmt;

use crate::error::{ArgumentError, Failure};
use crate::routine::Routine;
use crate::state::{State, Status};

/// Routine that completes once the accumulated elapsed time reaches its
/// duration.
///
/// A zero duration completes on the first advance, whatever elapsed value
/// is passed.
pub struct DelayRoutine {
    duration: f32,
    elapsed: f32,
    state: State,
}

impl DelayRoutine {
    pub(crate) fn new(duration: f32) -> Result<Self, ArgumentError> {
        if duration.is_nan() {
            return Err(ArgumentError::NanDuration);
        }
        if duration < 0.0 {
            return Err(ArgumentError::NegativeDuration { duration });
        }
        Ok(Self {
            duration,
            elapsed: 0.0,
            state: State::new(),
        })
    }

    /// The duration this delay waits for.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Time accumulated so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Time left until the delay completes, never negative.
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

impl Routine for DelayRoutine {
    fn advance(&mut self, elapsed: f32) -> bool {
        if !self.state.begin_step() {
            return true;
        }
        debug_assert!(elapsed >= 0.0, "elapsed time must not be negative");
        self.elapsed += elapsed;
        if self.elapsed >= self.duration {
            self.state.complete();
        }
        self.state.is_finished()
    }

    fn status(&self) -> Status {
        self.state.status()
    }

    fn failure(&self) -> Option<&Failure> {
        self.state.failure()
    }
}

impl fmt::Debug for DelayRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayRoutine")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("status", &self.state.status())
            .finish()
    }
}
