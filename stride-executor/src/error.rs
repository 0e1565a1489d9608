//! Errors returned by the driver.
/// Error returned from [`Driver`] operations.
///
/// [`Driver`]: crate::Driver
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum TickError {
    /// The host supplied an elapsed time that is negative or not a number.
    #[error("elapsed time must be a non-negative number, got {elapsed}")]
    InvalidElapsed {
        /// The rejected elapsed time.
        elapsed: f32,
    },
}
