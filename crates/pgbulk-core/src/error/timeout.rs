use super::Error;
use std::time::Duration;

#[derive(Debug)]
pub(super) struct TimeoutError {
    duration: Duration,
}

impl std::error::Error for TimeoutError {}

impl core::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "statement timed out after {:?}", self.duration)
    }
}

impl Error {
    /// Creates a timeout error for a statement that ran longer than `duration`.
    pub fn timeout(duration: Duration) -> Error {
        Error::from(super::ErrorKind::Timeout(TimeoutError { duration }))
    }

    /// Returns `true` if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Timeout(_)))
    }
}
