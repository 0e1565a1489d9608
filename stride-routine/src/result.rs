//! Write-once result storage and the read-only [`ResultContainer`] view.
use std::cell::Ref;
use std::fmt;

use crate::error::StateError;
use crate::routine::{ResultRoutine, RoutineRef};
use crate::state::State;

/// Write-once storage for the value of a result-bearing routine.
///
/// The slot is written by the routine's own stepping logic at the moment it
/// completes and read only through [`ResultSlot::get`], which applies the
/// legibility check of the owning [`State`].
pub(crate) struct ResultSlot<T> {
    value: Option<T>,
}

impl<T> ResultSlot<T> {
    pub(crate) fn empty() -> Self {
        Self { value: None }
    }

    /// Store `value` and complete `state`.
    ///
    /// ### Panics
    /// Panics if a value was already stored or `state` is terminal.
    pub(crate) fn resolve(&mut self, state: &mut State, value: T) {
        assert!(self.value.is_none(), "result already set");
        state.complete();
        self.value = Some(value);
    }

    pub(crate) fn get(&self, state: &State) -> Result<&T, StateError> {
        state.check_result()?;
        self.value.as_ref().ok_or(StateError::NotComplete)
    }
}

/// Read-only view onto the result of one routine.
///
/// The container never caches: each call to [`ResultContainer::result`]
/// re-checks the live routine, so a container created before the routine
/// finished becomes legible as soon as the routine completes.
pub struct ResultContainer<R: ?Sized> {
    routine: RoutineRef<R>,
}

impl<R> ResultContainer<R>
where
    R: ResultRoutine + ?Sized,
{
    pub(crate) fn new(routine: RoutineRef<R>) -> Self {
        Self { routine }
    }

    /// The routine this container reads from.
    pub fn routine(&self) -> &RoutineRef<R> {
        &self.routine
    }

    /// Borrow the result.
    ///
    /// Fails with [`StateError::NotComplete`] until the routine finished and
    /// with [`StateError::Failed`] if it finished in error.
    pub fn result(&self) -> Result<Ref<'_, R::Output>, StateError> {
        self.routine.result()
    }

    /// Returns `true` if [`ResultContainer::result`] would succeed.
    pub fn is_ready(&self) -> bool {
        let routine = self.routine.borrow();
        routine.is_complete() && !routine.is_error()
    }
}

impl<R: ?Sized> Clone for ResultContainer<R> {
    fn clone(&self) -> Self {
        Self {
            routine: self.routine.clone(),
        }
    }
}

impl<R> fmt::Debug for ResultContainer<R>
where
    R: ResultRoutine + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultContainer")
            .field("routine", &self.routine)
            .finish()
    }
}
