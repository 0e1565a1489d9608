//! The [`Routine`] traits and the shared [`RoutineRef`] handle.
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::{Failure, StateError};
use crate::result::ResultContainer;
use crate::state::Status;

/// A unit of deferred work that progresses only when advanced.
///
/// A routine starts in [`Status::Pending`], moves to [`Status::Running`] on
/// its first advance and ends in either [`Status::Complete`] or
/// [`Status::Error`]. Both terminal states count as finished.
///
/// Routines are driven from a single caller. Advancing a routine while it is
/// already being advanced (for example a group that contains itself) is a
/// precondition violation.
pub trait Routine {
    /// Move the routine forward by one step.
    ///
    /// `elapsed` is the time since the previous step, as supplied by the host.
    /// Returns `true` if the routine is finished after this step. On a
    /// finished routine this is a no-op that returns `true`.
    fn advance(&mut self, elapsed: f32) -> bool;

    /// Returns the current [`Status`].
    fn status(&self) -> Status;

    /// Returns the failure captured by the routine, if it finished in error.
    fn failure(&self) -> Option<&Failure>;

    /// Returns `true` if the routine finished, successfully or not.
    fn is_complete(&self) -> bool {
        self.status().is_finished()
    }

    /// Returns `true` if the routine finished with a failure.
    fn is_error(&self) -> bool {
        self.status() == Status::Error
    }

    /// Returns `true` if the routine was cancelled through its control handle.
    fn is_cancelled(&self) -> bool {
        self.failure().is_some_and(Failure::is_cancelled)
    }
}

/// A [`Routine`] that produces a value when it completes.
pub trait ResultRoutine: Routine {
    /// Type of the value produced on completion.
    type Output;

    /// Returns the produced value.
    ///
    /// Fails with [`StateError::NotComplete`] before the routine finished and
    /// with [`StateError::Failed`] if it finished with a failure.
    fn result(&self) -> Result<&Self::Output, StateError>;
}

impl<R> Routine for Box<R>
where
    R: Routine + ?Sized,
{
    fn advance(&mut self, elapsed: f32) -> bool {
        (**self).advance(elapsed)
    }

    fn status(&self) -> Status {
        (**self).status()
    }

    fn failure(&self) -> Option<&Failure> {
        (**self).failure()
    }
}

impl<R> ResultRoutine for Box<R>
where
    R: ResultRoutine + ?Sized,
{
    type Output = R::Output;

    fn result(&self) -> Result<&Self::Output, StateError> {
        (**self).result()
    }
}

/// Shared handle to a routine.
///
/// Combinators and hosts refer to routines created elsewhere through a
/// [`RoutineRef`]. Cloning the handle does not clone the routine. The handle
/// is not `Send`: a routine tree is ticked from one thread.
pub struct RoutineRef<R: ?Sized = dyn Routine> {
    inner: Rc<RefCell<R>>,
}

impl<R> RoutineRef<R>
where
    R: Routine + 'static,
{
    /// Move `routine` behind a shared handle.
    pub fn new(routine: R) -> Self {
        Self {
            inner: Rc::new(RefCell::new(routine)),
        }
    }

    /// Returns a type-erased handle to the same routine.
    pub fn erase(&self) -> RoutineRef {
        let inner: Rc<RefCell<dyn Routine>> = self.inner.clone();
        RoutineRef { inner }
    }
}

impl<R> RoutineRef<R>
where
    R: Routine + ?Sized,
{
    /// Advance the routine. See [`Routine::advance`].
    ///
    /// ### Panics
    /// Panics if the routine is already borrowed, which happens when it is
    /// advanced re-entrantly.
    pub fn advance(&self, elapsed: f32) -> bool {
        self.inner.borrow_mut().advance(elapsed)
    }

    /// Returns the current [`Status`] of the routine.
    pub fn status(&self) -> Status {
        self.inner.borrow().status()
    }

    /// Returns `true` if the routine finished, successfully or not.
    pub fn is_complete(&self) -> bool {
        self.inner.borrow().is_complete()
    }

    /// Returns `true` if the routine finished with a failure.
    pub fn is_error(&self) -> bool {
        self.inner.borrow().is_error()
    }

    /// Returns the failure captured by the routine, if any.
    pub fn failure(&self) -> Option<Failure> {
        self.inner.borrow().failure().cloned()
    }

    /// Immutably borrow the routine.
    pub fn borrow(&self) -> Ref<'_, R> {
        self.inner.borrow()
    }

    /// Returns `true` if both handles refer to the same routine.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R> RoutineRef<R>
where
    R: ResultRoutine + ?Sized,
{
    /// Borrow the value produced by the routine.
    ///
    /// Applies the same checks as [`ResultRoutine::result`].
    pub fn result(&self) -> Result<Ref<'_, R::Output>, StateError> {
        let routine = self.inner.borrow();
        if let Err(err) = routine.result() {
            return Err(err);
        }
        Ref::filter_map(routine, |routine| routine.result().ok())
            .map_err(|_| StateError::NotComplete)
    }

    /// Returns a read-only [`ResultContainer`] bound to this routine.
    pub fn container(&self) -> ResultContainer<R> {
        ResultContainer::new(self.clone())
    }
}

impl<R: ?Sized> Clone for RoutineRef<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for RoutineRef<R>
where
    R: Routine + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("RoutineRef");
        match self.inner.try_borrow() {
            Ok(routine) => dbg.field("status", &routine.status()),
            Err(_) => dbg.field("status", &"<advancing>"),
        };
        dbg.finish()
    }
}

/// Conversion into a group member.
///
/// Implemented for handles and optional handles so that a group can be built
/// from a collection with missing entries, which it then rejects.
pub trait IntoChild {
    /// Convert into an erased handle, or `None` if the member is missing.
    fn into_child(self) -> Option<RoutineRef>;
}

impl<R> IntoChild for RoutineRef<R>
where
    R: Routine + 'static,
{
    fn into_child(self) -> Option<RoutineRef> {
        Some(self.erase())
    }
}

impl IntoChild for RoutineRef {
    fn into_child(self) -> Option<RoutineRef> {
        Some(self)
    }
}

impl<R> IntoChild for &RoutineRef<R>
where
    R: ?Sized,
    RoutineRef<R>: IntoChild,
{
    fn into_child(self) -> Option<RoutineRef> {
        self.clone().into_child()
    }
}

impl<C> IntoChild for Option<C>
where
    C: IntoChild,
{
    fn into_child(self) -> Option<RoutineRef> {
        self.and_then(IntoChild::into_child)
    }
}
