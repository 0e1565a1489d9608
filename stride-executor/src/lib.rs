//! Provides a [`Driver`] that owns root routines and advances them once
//! per host cycle.
//!
//! The host calls [`Driver::tick`] from its frame loop with the time elapsed
//! since the previous frame. Every root is advanced once, in the order it was
//! spawned, and roots that finished are dropped at the end of the tick.
//! Handles returned by [`Driver::spawn`] keep a routine's result or failure
//! readable after the driver let go of it.
#![deny(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    clippy::missing_safety_doc
)]
use stride_routine::{Routine, RoutineRef};

mod error;

pub use error::TickError;

const LOG: &str = "stride::driver";

/// Owner of root routines.
///
/// A [`Driver`] is ticked from a single thread. Routines spawned onto it are
/// advanced in spawn order on each [`Driver::tick`].
#[derive(Default)]
pub struct Driver {
    roots: Vec<RoutineRef>,
    ticks: u64,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("roots", &self.roots.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Driver {
    /// Construct an empty [`Driver`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `routine` as a root and return a handle to it.
    ///
    /// The routine is first advanced on the next [`Driver::tick`].
    pub fn spawn<R>(&mut self, routine: R) -> RoutineRef<R>
    where
        R: Routine + 'static,
    {
        let handle = RoutineRef::new(routine);
        self.roots.push(handle.erase());
        handle
    }

    /// Register a routine that is already behind a shared handle.
    pub fn spawn_ref(&mut self, routine: RoutineRef) {
        self.roots.push(routine);
    }

    /// Advance every root once by `elapsed`.
    ///
    /// Roots that are finished after this tick are dropped. Returns how many
    /// were dropped.
    pub fn tick(&mut self, elapsed: f32) -> Result<usize, TickError> {
        check_elapsed(elapsed)?;
        self.ticks += 1;
        log::trace!(target: LOG, "tick.start tick={} roots={}", self.ticks, self.roots.len());

        for root in &self.roots {
            root.advance(elapsed);
        }

        let before = self.roots.len();
        let tick = self.ticks;
        self.roots.retain(|root| {
            if !root.is_complete() {
                return true;
            }
            match root.failure() {
                Some(failure) => {
                    log::warn!(target: LOG, "root failed tick={tick}: {failure}");
                }
                None => log::trace!(target: LOG, "root complete tick={tick}"),
            }
            false
        });
        Ok(before - self.roots.len())
    }

    /// Spawn `routine` and tick with a fixed `step` until it is finished.
    ///
    /// Other roots are advanced alongside it. A routine that never finishes
    /// keeps this looping, the same way blocking on a pending future would.
    pub fn block_on<R>(&mut self, routine: R, step: f32) -> Result<RoutineRef<R>, TickError>
    where
        R: Routine + 'static,
    {
        check_elapsed(step)?;
        let handle = self.spawn(routine);
        while !handle.is_complete() {
            self.tick(step)?;
        }
        Ok(handle)
    }

    /// Number of roots the driver still owns.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if the driver owns no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of ticks performed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn check_elapsed(elapsed: f32) -> Result<(), TickError> {
    if elapsed.is_nan() || elapsed < 0.0 {
        return Err(TickError::InvalidElapsed { elapsed });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use stride_routine::{delay, from_result, task, when_all, Status};

    use super::*;

    #[test]
    fn drops_finished_roots() {
        let mut driver = Driver::new();
        let short = driver.spawn(delay(1.0).unwrap());
        let long = driver.spawn(delay(2.0).unwrap());

        assert_eq!(driver.tick(1.0), Ok(1));
        assert_eq!(driver.len(), 1);
        assert!(short.is_complete());
        assert_eq!(long.status(), Status::Running);

        assert_eq!(driver.tick(1.0), Ok(1));
        assert!(driver.is_empty());
        assert_eq!(driver.ticks(), 2);
    }

    #[test]
    fn failed_root_keeps_failure_readable() {
        let mut driver = Driver::new();
        let failing = driver.spawn(task(|| Err::<u8, _>("bad config")));
        assert_eq!(driver.tick(0.0), Ok(1));
        assert!(driver.is_empty());
        assert_eq!(failing.failure().unwrap().to_string(), "bad config");
    }

    #[test]
    fn rejects_invalid_elapsed() {
        let mut driver = Driver::new();
        driver.spawn(delay(1.0).unwrap());
        assert_eq!(
            driver.tick(-0.5),
            Err(TickError::InvalidElapsed { elapsed: -0.5 })
        );
        assert!(driver.tick(f32::NAN).is_err());
        assert_eq!(driver.ticks(), 0);
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn block_on_returns_result() {
        let mut driver = Driver::new();
        let handle = driver.block_on(task(|| Ok::<_, std::io::Error>(2 + 2)), 0.016).unwrap();
        assert_eq!(*handle.result().unwrap(), 4);
    }

    #[test]
    fn block_on_advances_other_roots() {
        let mut driver = Driver::new();
        let background = driver.spawn(delay(10.0).unwrap());
        driver.block_on(delay(1.0).unwrap(), 0.25).unwrap();
        assert_eq!(driver.ticks(), 4);
        assert_eq!(background.borrow().elapsed(), 1.0);
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn shared_children_spawned_by_ref() {
        let mut driver = Driver::new();
        let child = RoutineRef::new(from_result(1));
        let group = RoutineRef::new(when_all([child.erase()]).unwrap());
        driver.spawn_ref(group.erase());
        assert_eq!(driver.tick(0.0), Ok(1));
        assert!(group.is_complete());
    }
}
