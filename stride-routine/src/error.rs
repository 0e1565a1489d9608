//! Errors surfaced by routines.
//!
//! - [`ArgumentError`]: invalid input rejected by a constructor.
//! - [`StateError`]: a result was read in a state where it is not legible.
//! - [`Failure`]: a failure captured while a routine was advanced. It is
//!   stored in the routine and re-surfaced on request, never propagated
//!   through [`Routine::advance`].
//!
//! [`Routine::advance`]: crate::Routine::advance
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

/// Error returned by constructors when their input is out of range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ArgumentError {
    /// A delay was requested with a negative duration.
    #[error("duration must not be negative, got {duration}")]
    NegativeDuration {
        /// The rejected duration.
        duration: f32,
    },
    /// A delay was requested with a duration that is not a number.
    #[error("duration must be a number")]
    NanDuration,
    /// A group was built with a missing routine.
    #[error("routine at index {index} is missing")]
    MissingChild {
        /// Position of the missing routine in the supplied collection.
        index: usize,
    },
}

/// Error returned when reading the result of a routine that cannot
/// provide one.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StateError {
    /// The routine has not finished yet.
    #[error("routine has not completed")]
    NotComplete,
    /// The routine finished with a failure; the failure is the source.
    #[error("routine finished with an error")]
    Failed(#[source] Failure),
}

impl StateError {
    /// Returns the captured failure if the routine finished with one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            StateError::NotComplete => None,
            StateError::Failed(failure) => Some(failure),
        }
    }
}

/// [`Failure`] is the failure a routine captured while it was advanced.
///
/// Failures are cheap to clone so that combinators can report the failures
/// of routines which are also referenced elsewhere.
#[derive(Clone)]
pub struct Failure {
    inner: Rc<Kind>,
}

#[derive(thiserror::Error, Debug)]
enum Kind {
    #[error(transparent)]
    Error(Box<dyn StdError + 'static>),
    #[error("routine panicked{}", panic_message(.0))]
    Panic(Box<dyn Any + Send + 'static>),
    #[error("routine was cancelled")]
    Cancelled,
    #[error("step sequence ended without setting a result")]
    MissingResult,
    #[error("{} grouped routine(s) failed", .0.len())]
    Group(Vec<ChildFailure>),
}

#[allow(clippy::borrowed_box)]
fn panic_message(payload: &Box<dyn Any + Send + 'static>) -> String {
    // Deref explicitly, `&Box<_>` would coerce to `&dyn Any` as the box itself.
    let payload: &(dyn Any + Send) = &**payload;
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!(": {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!(": {msg}")
    } else {
        String::new()
    }
}

impl Failure {
    /// Wrap an error returned by a computation.
    pub fn new(err: impl Into<Box<dyn StdError + 'static>>) -> Self {
        Self::from_kind(Kind::Error(err.into()))
    }

    pub(crate) fn panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self::from_kind(Kind::Panic(payload))
    }

    pub(crate) fn cancelled() -> Self {
        Self::from_kind(Kind::Cancelled)
    }

    pub(crate) fn missing_result() -> Self {
        Self::from_kind(Kind::MissingResult)
    }

    pub(crate) fn group(children: Vec<ChildFailure>) -> Self {
        Self::from_kind(Kind::Group(children))
    }

    fn from_kind(kind: Kind) -> Self {
        Self {
            inner: Rc::new(kind),
        }
    }

    /// Returns `true` if the routine panicked.
    pub fn is_panic(&self) -> bool {
        matches!(*self.inner, Kind::Panic(_))
    }

    /// Returns `true` if the routine was cancelled through its control handle.
    pub fn is_cancelled(&self) -> bool {
        matches!(*self.inner, Kind::Cancelled)
    }

    /// Returns `true` if a result-bearing step sequence ended without a result.
    pub fn is_missing_result(&self) -> bool {
        matches!(*self.inner, Kind::MissingResult)
    }

    /// Returns `true` if this is the aggregate failure of a group.
    pub fn is_group(&self) -> bool {
        matches!(*self.inner, Kind::Group(_))
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match &*self.inner {
            Kind::Error(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns the per-child failures of a group, in child order.
    ///
    /// Empty for every other kind of failure.
    pub fn children(&self) -> &[ChildFailure] {
        match &*self.inner {
            Kind::Group(children) => children,
            _ => &[],
        }
    }

    /// Returns `true` if both values refer to the same captured failure.
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Failure").field(&self.inner).finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// The failure of one routine inside a group.
#[derive(Debug, Clone)]
pub struct ChildFailure {
    index: usize,
    failure: Failure,
}

impl ChildFailure {
    pub(crate) fn new(index: usize, failure: Failure) -> Self {
        Self { index, failure }
    }

    /// Position of the failed routine in the group.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The failure the routine captured.
    pub fn failure(&self) -> &Failure {
        &self.failure
    }
}
