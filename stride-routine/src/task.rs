//! [`TaskRoutine`] runs a synchronous computation on its first advance.
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{Failure, StateError};
use crate::result::ResultSlot;
use crate::routine::{ResultRoutine, Routine};
use crate::state::{State, Status};

const LOG: &str = "stride::task";

type Computation<T> = Box<dyn FnOnce() -> Result<T, Failure>>;

/// Routine wrapping a computation that runs to completion in one step.
///
/// The first advance invokes the computation. `Ok` completes the routine
/// with the value, `Err` ends it in [`Status::Error`] with the error captured
/// as a [`Failure`]. A panic inside the computation is caught and captured
/// the same way; it never unwinds through [`Routine::advance`].
///
/// `TaskRoutine<()>` is the variant without a meaningful result.
pub struct TaskRoutine<T = ()> {
    computation: Option<Computation<T>>,
    result: ResultSlot<T>,
    state: State,
}

impl<T> TaskRoutine<T>
where
    T: 'static,
{
    pub(crate) fn new<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + 'static,
        E: Into<Box<dyn StdError + 'static>>,
    {
        let computation: Computation<T> = Box::new(move || f().map_err(Failure::new));
        Self {
            computation: Some(computation),
            result: ResultSlot::empty(),
            state: State::new(),
        }
    }
}

impl<T> Routine for TaskRoutine<T> {
    fn advance(&mut self, _elapsed: f32) -> bool {
        if !self.state.begin_step() {
            return true;
        }
        let computation = self
            .computation
            .take()
            .expect("computation consumed before the task finished");

        match panic::catch_unwind(AssertUnwindSafe(computation)) {
            Ok(Ok(value)) => self.result.resolve(&mut self.state, value),
            Ok(Err(failure)) => {
                log::debug!(target: LOG, "task.failed: {failure}");
                self.state.fail(failure);
            }
            Err(payload) => {
                let failure = Failure::panic(payload);
                log::debug!(target: LOG, "task.panicked: {failure}");
                self.state.fail(failure);
            }
        }
        true
    }

    fn status(&self) -> Status {
        self.state.status()
    }

    fn failure(&self) -> Option<&Failure> {
        self.state.failure()
    }
}

impl<T> ResultRoutine for TaskRoutine<T> {
    type Output = T;

    fn result(&self) -> Result<&T, StateError> {
        self.result.get(&self.state)
    }
}

impl<T> fmt::Debug for TaskRoutine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRoutine")
            .field("status", &self.state.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::task;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("computation failed: {0}")]
    struct ComputeError(&'static str);

    #[test]
    fn runs_once_on_first_advance() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut routine = task(move || {
            counter.set(counter.get() + 1);
            Ok::<_, ComputeError>(42)
        });

        assert_eq!(routine.status(), Status::Pending);
        assert_eq!(calls.get(), 0);
        assert!(routine.advance(0.016));
        assert!(routine.advance(0.016));
        assert_eq!(calls.get(), 1);
        assert_eq!(*routine.result().unwrap(), 42);
    }

    #[test]
    fn failure_is_captured() {
        let mut routine = task(|| Err::<(), _>(ComputeError("disk")));
        assert!(routine.advance(0.0));
        assert!(routine.is_complete());
        assert!(routine.is_error());

        let failure = routine.failure().unwrap();
        assert_eq!(failure.downcast_ref::<ComputeError>(), Some(&ComputeError("disk")));

        let err = routine.result().unwrap_err();
        assert!(err.failure().unwrap().ptr_eq(failure));
    }

    #[test]
    fn panic_is_captured() {
        let mut routine = task(|| -> Result<u8, ComputeError> { panic!("exploded") });
        assert!(routine.advance(0.0));
        assert!(routine.is_error());
        assert!(routine.failure().unwrap().is_panic());
        assert!(matches!(routine.result(), Err(StateError::Failed(_))));
    }

    #[test]
    fn result_before_advance_is_not_complete() {
        let routine = task(|| Ok::<_, ComputeError>("later"));
        assert!(matches!(routine.result(), Err(StateError::NotComplete)));
    }
}
