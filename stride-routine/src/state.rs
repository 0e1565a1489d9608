//! Routine state transitions.
use crate::error::{Failure, StateError};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    struct Flags: u8 {
        /// The routine has been advanced at least once.
        const RUNNING  = 1<<0;
        /// The routine has finished, successfully or not.
        const COMPLETE = 1<<1;
        /// The routine finished with a captured [`Failure`].
        const ERROR    = 1<<2;
    }
}

/// The observable lifecycle of a routine.
///
/// `Pending` and `Running` may be left, `Complete` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Created but never advanced.
    Pending,
    /// Advanced at least once and not yet finished.
    Running,
    /// Finished successfully.
    Complete,
    /// Finished with a captured failure.
    Error,
}

impl Status {
    /// Returns `true` for the terminal states, [`Status::Complete`] and [`Status::Error`].
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Complete | Status::Error)
    }
}

/// [`State`] tracks the lifecycle flags of a routine together with the
/// failure it captured, if any.
///
/// Every built-in routine embeds one. Transitions out of a terminal state
/// are bugs in the routine and panic.
#[derive(Debug)]
pub(crate) struct State {
    flags: Flags,
    failure: Option<Failure>,
}

impl State {
    /// Build a new [`State`] in [`Status::Pending`].
    pub(crate) fn new() -> Self {
        Self {
            flags: Flags::empty(),
            failure: None,
        }
    }

    #[inline]
    pub(crate) fn status(&self) -> Status {
        if self.flags.contains(Flags::ERROR) {
            Status::Error
        } else if self.flags.contains(Flags::COMPLETE) {
            Status::Complete
        } else if self.flags.contains(Flags::RUNNING) {
            Status::Running
        } else {
            Status::Pending
        }
    }

    /// Returns true if the routine is complete or failed.
    #[inline]
    pub(crate) fn is_finished(&self) -> bool {
        self.flags.contains(Flags::COMPLETE)
    }

    #[inline]
    pub(crate) fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Prepare the routine for a step.
    ///
    /// Sets the [`RUNNING`] flag and returns `true` if the routine may make
    /// progress. Returns `false` without touching anything if it is terminal.
    ///
    /// [`RUNNING`]: Flags::RUNNING
    #[inline]
    pub(crate) fn begin_step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.flags.insert(Flags::RUNNING);
        true
    }

    /// Mark the routine as successfully finished.
    pub(crate) fn complete(&mut self) {
        assert!(!self.is_finished(), "routine already finished");
        self.flags.insert(Flags::COMPLETE);
    }

    /// Mark the routine as finished with `failure`.
    pub(crate) fn fail(&mut self, failure: Failure) {
        assert!(!self.is_finished(), "routine already finished");
        self.flags.insert(Flags::COMPLETE | Flags::ERROR);
        self.failure = Some(failure);
    }

    /// Check whether a result may be read in the current state.
    ///
    /// Results are only legible once the routine is finished and did not fail.
    pub(crate) fn check_result(&self) -> Result<(), StateError> {
        if !self.is_finished() {
            return Err(StateError::NotComplete);
        }
        match &self.failure {
            Some(failure) => Err(StateError::Failed(failure.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_first_step() {
        let mut state = State::new();
        assert_eq!(state.status(), Status::Pending);
        assert!(state.begin_step());
        assert_eq!(state.status(), Status::Running);
    }

    #[test]
    fn terminal_states_reject_steps() {
        let mut state = State::new();
        state.complete();
        assert!(!state.begin_step());
        assert_eq!(state.status(), Status::Complete);

        let mut state = State::new();
        state.fail(Failure::cancelled());
        assert!(!state.begin_step());
        assert_eq!(state.status(), Status::Error);
        assert!(state.is_finished());
    }

    #[test]
    #[should_panic(expected = "routine already finished")]
    fn completing_twice_panics() {
        let mut state = State::new();
        state.complete();
        state.complete();
    }

    #[test]
    fn result_legibility() {
        let mut state = State::new();
        assert!(matches!(state.check_result(), Err(StateError::NotComplete)));
        state.complete();
        assert!(state.check_result().is_ok());

        let mut state = State::new();
        state.fail(Failure::cancelled());
        let Err(StateError::Failed(failure)) = state.check_result() else {
            panic!("expected failed result");
        };
        assert!(failure.is_cancelled());
    }
}
