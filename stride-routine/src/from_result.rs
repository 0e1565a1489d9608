//! Routines that are complete from construction.
use std::fmt;

use crate::error::{Failure, StateError};
use crate::result::ResultSlot;
use crate::routine::{ResultRoutine, Routine};
use crate::state::{State, Status};

/// Routine holding a precomputed value.
///
/// It is complete from construction on and never needs an advance.
pub struct FromResultRoutine<T> {
    result: ResultSlot<T>,
    state: State,
}

impl<T> FromResultRoutine<T> {
    pub(crate) fn new(value: T) -> Self {
        let mut state = State::new();
        let mut result = ResultSlot::empty();
        result.resolve(&mut state, value);
        Self { result, state }
    }
}

impl<T> Routine for FromResultRoutine<T> {
    fn advance(&mut self, _elapsed: f32) -> bool {
        true
    }

    fn status(&self) -> Status {
        self.state.status()
    }

    fn failure(&self) -> Option<&Failure> {
        None
    }
}

impl<T> ResultRoutine for FromResultRoutine<T> {
    type Output = T;

    fn result(&self) -> Result<&T, StateError> {
        self.result.get(&self.state)
    }
}

impl<T: fmt::Debug> fmt::Debug for FromResultRoutine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromResultRoutine")
            .field("result", &self.result.get(&self.state).ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_result;

    #[test]
    fn legible_without_advance() {
        let routine = from_result(vec![1, 2, 3]);
        assert!(routine.is_complete());
        assert!(!routine.is_error());
        assert_eq!(routine.status(), Status::Complete);
        assert_eq!(routine.result().unwrap(), &vec![1, 2, 3]);
    }

    #[test]
    fn advance_is_noop() {
        let mut routine = from_result('x');
        assert!(routine.advance(1.0));
        assert_eq!(routine.result().unwrap(), &'x');
    }
}
