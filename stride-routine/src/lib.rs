//! Cooperative routines for hosts that advance time in discrete steps.
//!
//! A [`Routine`] is a unit of deferred work that only makes progress when the
//! host calls [`Routine::advance`], typically once per frame with the time
//! elapsed since the previous frame. There is no suspension and nothing
//! blocks: a routine that is waiting simply stays pending between advances.
//!
//! Failures raised while a routine runs are captured as [`Failure`] values
//! and stored in the routine. They surface when the result is requested,
//! which lets combinators keep advancing siblings after one of them failed.
//!
//! # Components
//! - [`delay`]: completes after a fixed amount of elapsed time.
//! - [`task`]: runs a synchronous computation on its first advance.
//! - [`from_result`]: complete from construction with a known value.
//! - [`when_all`] and [`when_all!`]: completes once every child completed.
//! - [`from_iter`], [`with_control`] and [`with_result`]: adapt a step
//!   sequence, optionally handing it a [`Control`] to end the routine early.
//! - [`RoutineRef`] and [`ResultContainer`]: shared handles and read-only
//!   result views.
//!
//! Routines are not `Send`. A routine tree is ticked from a single thread by
//! a single driver.
//!
//! ```rust
//! use stride_routine::{delay, task, when_all, RoutineRef, Routine};
//!
//! let load = RoutineRef::new(task(|| Ok::<_, std::io::Error>(String::from("level-1"))));
//! let fade = RoutineRef::new(delay(0.5).unwrap());
//! let mut both = when_all([load.erase(), fade.erase()]).unwrap();
//!
//! while !both.advance(0.25) {}
//! assert_eq!(*load.result().unwrap(), "level-1");
//! ```
#![deny(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    clippy::missing_safety_doc
)]
use std::error::Error as StdError;

mod control;
mod delay;
mod enumerator;
mod error;
mod from_result;
mod group;
mod result;
mod routine;
mod state;
mod task;

pub use control::Control;
pub use delay::DelayRoutine;
pub use enumerator::{ControlledResultRoutine, ControlledRoutine, EnumeratorRoutine};
pub use error::{ArgumentError, ChildFailure, Failure, StateError};
pub use from_result::FromResultRoutine;
pub use group::GroupRoutine;
pub use result::ResultContainer;
pub use routine::{IntoChild, ResultRoutine, Routine, RoutineRef};
pub use state::Status;
pub use task::TaskRoutine;

/// Create a routine that completes once `duration` time has elapsed.
///
/// Fails if `duration` is negative or not a number.
pub fn delay(duration: f32) -> Result<DelayRoutine, ArgumentError> {
    DelayRoutine::new(duration)
}

/// Create a routine that runs `f` to completion on its first advance.
///
/// An `Err` returned by `f`, or a panic inside it, is captured as the
/// routine's [`Failure`].
pub fn task<T, E, F>(f: F) -> TaskRoutine<T>
where
    F: FnOnce() -> Result<T, E> + 'static,
    E: Into<Box<dyn StdError + 'static>>,
    T: 'static,
{
    TaskRoutine::new(f)
}

/// Create a routine that completes once every routine in `children` has
/// finished.
///
/// Fails with [`ArgumentError::MissingChild`] if an element is `None`. An
/// empty collection yields a routine that is already complete.
pub fn when_all<I>(children: I) -> Result<GroupRoutine, ArgumentError>
where
    I: IntoIterator,
    I::Item: IntoChild,
{
    GroupRoutine::new(children)
}

/// Create a routine that is already complete with `value`.
pub fn from_result<T>(value: T) -> FromResultRoutine<T> {
    FromResultRoutine::new(value)
}

/// Create a routine that pulls one step from `steps` per advance and
/// completes when the steps run out.
pub fn from_iter<I>(steps: I) -> EnumeratorRoutine<I::IntoIter>
where
    I: IntoIterator,
{
    EnumeratorRoutine::new(steps.into_iter())
}

/// Create a routine from a step sequence that is handed a [`Control`].
///
/// `f` is called once, immediately, with the control handle.
pub fn with_control<F, S>(f: F) -> ControlledRoutine<S::IntoIter>
where
    F: FnOnce(Control) -> S,
    S: IntoIterator,
{
    ControlledRoutine::new(f)
}

/// Create a result-bearing routine from a step sequence that is handed a
/// [`Control`] to report its result with.
///
/// `f` is called once, immediately, with the control handle.
pub fn with_result<T, F, S>(f: F) -> ControlledResultRoutine<S::IntoIter, T>
where
    F: FnOnce(Control<T>) -> S,
    S: IntoIterator,
{
    ControlledResultRoutine::new(f)
}

/// Create a [`GroupRoutine`] from a list of routine handles.
///
/// Each argument may be a [`RoutineRef`], a reference to one, or an
/// `Option` of either.
///
/// ```rust
/// use stride_routine::{delay, from_result, RoutineRef, Routine};
///
/// let a = RoutineRef::new(delay(1.0).unwrap());
/// let b = RoutineRef::new(from_result(7));
/// let mut group = stride_routine::when_all!(&a, &b).unwrap();
/// assert!(group.advance(1.0));
/// ```
#[macro_export]
macro_rules! when_all {
    ($($child:expr),* $(,)?) => {{
        let children: ::std::vec::Vec<::std::option::Option<$crate::RoutineRef>> =
            ::std::vec![$($crate::IntoChild::into_child($child)),*];
        $crate::when_all(children)
    }};
}
