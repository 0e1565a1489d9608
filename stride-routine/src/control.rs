//! The [`Control`] handle passed into step sequences.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A termination request raised through a [`Control`].
#[derive(Debug)]
pub(crate) enum Signal<T> {
    Complete,
    Result(T),
    Cancel,
}

#[derive(Debug)]
enum Slot<T> {
    /// Nothing requested yet.
    Idle,
    /// A request waiting to be observed by the routine.
    Raised(Signal<T>),
    /// The routine observed a request and finished.
    Observed,
}

/// Handle through which a step sequence ends its routine.
///
/// A sequence receives its [`Control`] when it is constructed and may use it
/// from any step to complete, set a result or cancel, independently of
/// whether it has steps left. The routine checks the handle before and after
/// pulling each step and stops pulling once a request is seen.
///
/// The handle can be cloned, so a host holding a clone may also end the
/// routine between advances.
pub struct Control<T = ()> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Control<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Idle)),
        }
    }

    /// Request cancellation.
    ///
    /// The routine ends in error with a cancellation failure. Ignored if a
    /// request was already made.
    pub fn cancel(&self) {
        self.raise(Signal::Cancel);
    }

    /// Declare the result and complete the routine.
    ///
    /// On the `Control<()>` handed to [`with_control`] this is the same as
    /// [`Control::complete`], except that it panics instead of being ignored.
    ///
    /// ### Panics
    /// Panics if a result, completion or cancellation was already requested,
    /// or if the routine already finished because its steps ran out.
    ///
    /// [`with_control`]: crate::with_control
    pub fn set_result(&self, value: T) {
        let mut slot = self.slot.borrow_mut();
        assert!(
            matches!(*slot, Slot::Idle),
            "result set after the routine was already ended"
        );
        *slot = Slot::Raised(Signal::Result(value));
    }

    /// Returns `true` once any request has been made.
    pub fn is_requested(&self) -> bool {
        !matches!(*self.slot.borrow(), Slot::Idle)
    }

    /// Take the pending request, if any, marking it observed.
    pub(crate) fn take(&self) -> Option<Signal<T>> {
        let mut slot = self.slot.borrow_mut();
        match std::mem::replace(&mut *slot, Slot::Observed) {
            Slot::Raised(signal) => Some(signal),
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Mark the handle as spent once the routine finished on its own.
    pub(crate) fn close(&self) {
        *self.slot.borrow_mut() = Slot::Observed;
    }

    fn raise(&self, signal: Signal<T>) {
        let mut slot = self.slot.borrow_mut();
        if matches!(*slot, Slot::Idle) {
            *slot = Slot::Raised(signal);
        }
    }
}

impl Control<()> {
    /// Declare the routine complete.
    ///
    /// Ignored if a request was already made.
    pub fn complete(&self) {
        self.raise(Signal::Complete);
    }
}

impl<T> Clone for Control<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for Control<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("requested", &self.is_requested())
            .finish()
    }
}
