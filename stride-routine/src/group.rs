//! Wait-for-all combinator.
use std::fmt;
use std::mem;

use crate::error::{ArgumentError, ChildFailure, Failure};
use crate::routine::{IntoChild, Routine, RoutineRef};
use crate::state::{State, Status};

const LOG: &str = "stride::group";

/// Routine that finishes once every child routine has finished.
///
/// Children are ticked in insertion order on each advance. A child that is
/// already finished, whether by this group or by another owner, is never
/// ticked again. A failing child does not stop its siblings: the group keeps
/// advancing the rest and only then ends, in [`Status::Error`] if any child
/// failed. The aggregate [`Failure`] lists every failed child.
///
/// The group shares its children with whoever created them; it never
/// constructs or drops routines on its own.
pub struct GroupRoutine {
    children: Vec<RoutineRef>,
    finished: Vec<bool>,
    remaining: usize,
    failures: Vec<ChildFailure>,
    state: State,
}

impl GroupRoutine {
    pub(crate) fn new<I>(children: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator,
        I::Item: IntoChild,
    {
        let children = children
            .into_iter()
            .enumerate()
            .map(|(index, child)| {
                child
                    .into_child()
                    .ok_or(ArgumentError::MissingChild { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = State::new();
        if children.is_empty() {
            state.complete();
        }
        Ok(Self {
            finished: vec![false; children.len()],
            remaining: children.len(),
            children,
            failures: Vec::new(),
            state,
        })
    }

    /// Number of children in the group.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of children the group has not yet seen finish.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The children, in insertion order.
    pub fn children(&self) -> &[RoutineRef] {
        &self.children
    }

    /// Failures of every child that finished in error, in child order.
    ///
    /// Empty until the group itself has finished.
    pub fn failures(&self) -> &[ChildFailure] {
        match self.state.failure() {
            Some(failure) => failure.children(),
            None => &[],
        }
    }
}

impl Routine for GroupRoutine {
    fn advance(&mut self, elapsed: f32) -> bool {
        if !self.state.begin_step() {
            return true;
        }

        for (index, (child, finished)) in self
            .children
            .iter()
            .zip(self.finished.iter_mut())
            .enumerate()
        {
            if *finished {
                continue;
            }
            if !child.is_complete() && !child.advance(elapsed) {
                continue;
            }
            *finished = true;
            self.remaining -= 1;
            if let Some(failure) = child.failure() {
                log::debug!(target: LOG, "group.child_failed index={index}: {failure}");
                self.failures.push(ChildFailure::new(index, failure));
            }
        }

        if self.remaining == 0 {
            if self.failures.is_empty() {
                log::trace!(target: LOG, "group.complete children={}", self.children.len());
                self.state.complete();
            } else {
                let failures = mem::take(&mut self.failures);
                log::debug!(target: LOG, "group.failed failed={}", failures.len());
                self.state.fail(Failure::group(failures));
            }
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

impl fmt::Debug for GroupRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRoutine")
            .field("children", &self.children.len())
            .field("remaining", &self.remaining)
            .field("status", &self.state.status())
            .finish()
    }
}
