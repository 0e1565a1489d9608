//! Routines driven by an externally supplied step sequence.
//!
//! A step sequence is any [`Iterator`]; its items are opaque and discarded.
//! Each advance pulls at most one item. Two independent signals end the
//! routine and both are checked on every advance:
//!
//! - the sequence is exhausted, or
//! - the sequence (or a host holding a clone of the handle) made a request
//!   through its [`Control`], possibly long before running out of steps.
//!
//! A request always takes precedence over exhaustion observed in the same
//! step, and once a request is seen no further step is pulled.
use std::fmt;

use crate::control::{Control, Signal};
use crate::error::{Failure, StateError};
use crate::result::ResultSlot;
use crate::routine::{ResultRoutine, Routine};
use crate::state::{State, Status};

const LOG: &str = "stride::enumerator";

/// Routine that completes when its step sequence is exhausted.
pub struct EnumeratorRoutine<I> {
    steps: I,
    state: State,
}

impl<I> EnumeratorRoutine<I>
where
    I: Iterator,
{
    pub(crate) fn new(steps: I) -> Self {
        Self {
            steps,
            state: State::new(),
        }
    }
}

impl<I> Routine for EnumeratorRoutine<I>
where
    I: Iterator,
{
    fn advance(&mut self, _elapsed: f32) -> bool {
        if !self.state.begin_step() {
            return true;
        }
        if self.steps.next().is_none() {
            log::trace!(target: LOG, "enumerator.exhausted");
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

impl<I> fmt::Debug for EnumeratorRoutine<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumeratorRoutine")
            .field("status", &self.state.status())
            .finish()
    }
}

/// What a sequence ending without a result means.
#[derive(Debug, Clone, Copy)]
enum Ending {
    Complete,
    MissingResult,
}

/// Stepping logic shared by the controlled adapters.
struct Controlled<I, T> {
    steps: I,
    control: Control<T>,
    result: ResultSlot<T>,
    ending: Ending,
    state: State,
}

impl<I, T> Controlled<I, T>
where
    I: Iterator,
{
    fn new<F, S>(f: F, ending: Ending) -> Self
    where
        F: FnOnce(Control<T>) -> S,
        S: IntoIterator<IntoIter = I>,
    {
        let control = Control::new();
        let steps = f(control.clone()).into_iter();
        Self {
            steps,
            control,
            result: ResultSlot::empty(),
            ending,
            state: State::new(),
        }
    }

    fn advance(&mut self) -> bool {
        if !self.state.begin_step() {
            return true;
        }
        if self.finish_on_request() {
            return true;
        }
        let exhausted = self.steps.next().is_none();
        if self.finish_on_request() {
            return true;
        }
        if exhausted {
            log::trace!(target: LOG, "controlled.exhausted");
            self.finish_without_result();
        }
        self.state.is_finished()
    }

    fn finish_on_request(&mut self) -> bool {
        let Some(signal) = self.control.take() else {
            return false;
        };
        match signal {
            Signal::Complete => {
                log::trace!(target: LOG, "controlled.signal complete");
                self.finish_without_result();
            }
            Signal::Result(value) => {
                log::trace!(target: LOG, "controlled.signal result");
                self.result.resolve(&mut self.state, value);
            }
            Signal::Cancel => {
                log::debug!(target: LOG, "controlled.signal cancel");
                self.state.fail(Failure::cancelled());
            }
        }
        true
    }

    fn finish_without_result(&mut self) {
        self.control.close();
        match self.ending {
            Ending::Complete => self.state.complete(),
            Ending::MissingResult => {
                log::debug!(target: LOG, "controlled.missing_result");
                self.state.fail(Failure::missing_result());
            }
        }
    }
}

/// Routine driven by a step sequence that was given a [`Control`].
///
/// Ends when the sequence is exhausted or when [`Control::complete`] or
/// [`Control::cancel`] is called, whichever is observed first.
pub struct ControlledRoutine<I> {
    inner: Controlled<I, ()>,
}

impl<I> ControlledRoutine<I>
where
    I: Iterator,
{
    pub(crate) fn new<F, S>(f: F) -> Self
    where
        F: FnOnce(Control) -> S,
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            inner: Controlled::new(f, Ending::Complete),
        }
    }

    /// Returns a clone of the control handle given to the sequence.
    pub fn control(&self) -> Control {
        self.inner.control.clone()
    }
}

impl<I> Routine for ControlledRoutine<I>
where
    I: Iterator,
{
    fn advance(&mut self, _elapsed: f32) -> bool {
        self.inner.advance()
    }

    fn status(&self) -> Status {
        self.inner.state.status()
    }

    fn failure(&self) -> Option<&Failure> {
        self.inner.state.failure()
    }
}

impl<I> fmt::Debug for ControlledRoutine<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlledRoutine")
            .field("status", &self.inner.state.status())
            .finish()
    }
}

/// Routine driven by a step sequence that reports a result through its
/// [`Control`].
///
/// [`Control::set_result`] completes the routine with the value. A sequence
/// that runs out of steps, or declares completion, without having set a
/// result ends the routine in error with [`Failure::is_missing_result`].
pub struct ControlledResultRoutine<I, T> {
    inner: Controlled<I, T>,
}

impl<I, T> ControlledResultRoutine<I, T>
where
    I: Iterator,
{
    pub(crate) fn new<F, S>(f: F) -> Self
    where
        F: FnOnce(Control<T>) -> S,
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            inner: Controlled::new(f, Ending::MissingResult),
        }
    }

    /// Returns a clone of the control handle given to the sequence.
    pub fn control(&self) -> Control<T> {
        self.inner.control.clone()
    }
}

impl<I, T> Routine for ControlledResultRoutine<I, T>
where
    I: Iterator,
{
    fn advance(&mut self, _elapsed: f32) -> bool {
        self.inner.advance()
    }

    fn status(&self) -> Status {
        self.inner.state.status()
    }

    fn failure(&self) -> Option<&Failure> {
        self.inner.state.failure()
    }
}

impl<I, T> ResultRoutine for ControlledResultRoutine<I, T>
where
    I: Iterator,
{
    type Output = T;

    fn result(&self) -> Result<&T, StateError> {
        self.inner.result.get(&self.inner.state)
    }
}

impl<I, T> fmt::Debug for ControlledResultRoutine<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlledResultRoutine")
            .field("status", &self.inner.state.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::{from_iter, with_control, with_result};

    #[test]
    fn plain_sequence_completes_on_exhaustion() {
        let mut routine = from_iter(0..3);
        assert!(!routine.advance(0.0));
        assert!(!routine.advance(0.0));
        assert!(!routine.advance(0.0));
        assert_eq!(routine.status(), Status::Running);
        assert!(routine.advance(0.0));
        assert_eq!(routine.status(), Status::Complete);
    }

    #[test]
    fn empty_sequence_completes_on_first_advance() {
        let mut routine = from_iter(std::iter::empty::<()>());
        assert_eq!(routine.status(), Status::Pending);
        assert!(routine.advance(0.0));
    }

    #[test]
    fn completion_request_stops_pulling() {
        let pulls = Rc::new(Cell::new(0));
        let counter = pulls.clone();
        let mut routine = with_control(move |control| {
            std::iter::repeat_with(move || {
                counter.set(counter.get() + 1);
                if counter.get() == 2 {
                    control.complete();
                }
            })
        });

        assert!(!routine.advance(0.0));
        assert!(routine.advance(0.0));
        assert_eq!(routine.status(), Status::Complete);
        assert!(routine.advance(0.0));
        assert_eq!(pulls.get(), 2);
    }

    #[test]
    fn host_request_between_advances() {
        let pulls = Rc::new(Cell::new(0));
        let counter = pulls.clone();
        let mut routine = with_control(move |_| {
            std::iter::repeat_with(move || counter.set(counter.get() + 1))
        });

        routine.advance(0.0);
        routine.control().cancel();
        assert!(routine.advance(0.0));
        assert_eq!(pulls.get(), 1);
        assert!(routine.is_error());
        assert!(routine.is_cancelled());
    }

    #[test]
    fn request_wins_over_exhaustion_in_same_step() {
        let mut routine = with_result(|control| {
            let mut sent = false;
            std::iter::from_fn(move || {
                if !sent {
                    sent = true;
                    control.set_result("value");
                }
                None::<()>
            })
        });
        assert!(routine.advance(0.0));
        assert_eq!(routine.result().unwrap(), &"value");
    }

    #[test]
    fn result_set_mid_sequence() {
        let mut routine = with_result(|control| {
            let mut step = 0;
            std::iter::from_fn(move || {
                step += 1;
                if step == 3 {
                    control.set_result(step * 10);
                }
                Some(())
            })
        });

        assert!(!routine.advance(0.0));
        assert!(matches!(routine.result(), Err(StateError::NotComplete)));
        assert!(!routine.advance(0.0));
        assert!(routine.advance(0.0));
        assert_eq!(routine.result().unwrap(), &30);
    }

    #[test]
    fn exhaustion_without_result_fails() {
        let mut routine = with_result(|_: Control<u32>| 0..1);
        assert!(!routine.advance(0.0));
        assert!(routine.advance(0.0));
        assert!(routine.is_error());
        assert!(routine.failure().unwrap().is_missing_result());
        assert!(matches!(routine.result(), Err(StateError::Failed(_))));
    }

    #[test]
    #[should_panic(expected = "result set after the routine was already ended")]
    fn result_after_missing_result_panics() {
        let mut routine = with_result(|_: Control<u32>| std::iter::empty::<()>());
        assert!(routine.advance(0.0));
        assert!(routine.failure().unwrap().is_missing_result());
        routine.control().set_result(7);
    }

    #[test]
    fn captured_handle_rejects_late_result() {
        let captured = Rc::new(RefCell::new(None));
        let slot = captured.clone();
        let mut routine = with_result(move |control: Control<u32>| {
            *slot.borrow_mut() = Some(control);
            0..1
        });
        assert!(!routine.advance(0.0));
        assert!(routine.advance(0.0));

        let control = captured.borrow_mut().take().unwrap();
        let late = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| control.set_result(3)));
        assert!(late.is_err());
        assert!(routine.failure().unwrap().is_missing_result());
        assert!(matches!(routine.result(), Err(StateError::Failed(_))));
    }

    #[test]
    fn unit_result_completes_plain_sequence() {
        let mut routine = with_control(|control| {
            control.set_result(());
            std::iter::repeat(())
        });
        assert!(routine.advance(0.0));
        assert_eq!(routine.status(), Status::Complete);
    }

    #[test]
    fn exhaustion_with_controller_completes() {
        let mut routine = with_control(|_| [(), ()]);
        assert!(!routine.advance(0.0));
        assert!(!routine.advance(0.0));
        assert!(routine.advance(0.0));
        assert!(!routine.is_error());
    }

    #[test]
    fn cancel_before_first_advance() {
        let mut routine = with_result(|_: Control<u8>| std::iter::repeat(()));
        routine.control().cancel();
        assert_eq!(routine.status(), Status::Pending);
        assert!(routine.advance(0.0));
        assert!(routine.is_cancelled());
    }
}
