//! Per-event-type handler registry.
//!
//! A [`Dispatcher<E>`] answers "which handlers care about events of type
//! `E`, in which order". It is an ordinary value: the application builds one
//! per event type at start-up, injecting the [`HandlersProvider`] it wants,
//! and passes it by reference to whatever dispatches events. Replacing the
//! provider later is explicit through [`Dispatcher::set_provider`].
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use stride_event::{Dispatcher, HandlerList};
//!
//! struct Jumped { height: u32 }
//!
//! let total = Rc::new(Cell::new(0));
//! let mut handlers = HandlerList::new();
//! let sum = total.clone();
//! handlers.subscribe(move |ev: &Jumped| sum.set(sum.get() + ev.height));
//!
//! let dispatcher = Dispatcher::new(handlers);
//! dispatcher.dispatch(&Jumped { height: 3 });
//! assert_eq!(total.get(), 3);
//! ```
#![deny(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    clippy::missing_safety_doc
)]
use std::fmt;
use std::rc::Rc;

const LOG: &str = "stride::event";

/// Reacts to events of type `E`.
pub trait Handler<E> {
    /// Handle one event.
    fn handle(&self, event: &E);
}

impl<E, F> Handler<E> for F
where
    F: Fn(&E),
{
    fn handle(&self, event: &E) {
        (self)(event)
    }
}

/// Source of the handlers registered for events of type `E`.
pub trait HandlersProvider<E> {
    /// Returns the handlers in the order they should run.
    fn handlers(&self) -> Vec<Rc<dyn Handler<E>>>;
}

/// The default [`HandlersProvider`]: an ordered list of handlers.
pub struct HandlerList<E> {
    handlers: Vec<Rc<dyn Handler<E>>>,
}

impl<E> HandlerList<E> {
    /// Construct an empty [`HandlerList`].
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append `handler`; it runs after every handler subscribed before it.
    pub fn subscribe<H>(&mut self, handler: H)
    where
        H: Handler<E> + 'static,
    {
        self.handlers.push(Rc::new(handler));
    }

    /// Number of subscribed handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is subscribed.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for HandlerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> HandlersProvider<E> for HandlerList<E> {
    fn handlers(&self) -> Vec<Rc<dyn Handler<E>>> {
        self.handlers.clone()
    }
}

impl<E> fmt::Debug for HandlerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerList")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Registry resolving the handlers for events of type `E`.
pub struct Dispatcher<E> {
    provider: Box<dyn HandlersProvider<E>>,
}

impl<E> Dispatcher<E> {
    /// Construct a [`Dispatcher`] backed by `provider`.
    pub fn new<P>(provider: P) -> Self
    where
        P: HandlersProvider<E> + 'static,
    {
        Self {
            provider: Box::new(provider),
        }
    }

    /// Replace the provider, returning the previous one.
    pub fn set_provider<P>(&mut self, provider: P) -> Box<dyn HandlersProvider<E>>
    where
        P: HandlersProvider<E> + 'static,
    {
        log::debug!(target: LOG, "provider.replaced event={}", std::any::type_name::<E>());
        std::mem::replace(&mut self.provider, Box::new(provider))
    }

    /// The handlers for `E`, in order.
    pub fn handlers(&self) -> Vec<Rc<dyn Handler<E>>> {
        self.provider.handlers()
    }

    /// Call every handler with `event`, in order, and return how many ran.
    pub fn dispatch(&self, event: &E) -> usize {
        let handlers = self.handlers();
        log::trace!(
            target: LOG,
            "dispatch event={} handlers={}",
            std::any::type_name::<E>(),
            handlers.len()
        );
        for handler in &handlers {
            handler.handle(event);
        }
        handlers.len()
    }
}

impl<E: 'static> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new(HandlerList::new())
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("event", &std::any::type_name::<E>())
            .finish()
    }
}
