//! The three-way result returned by every action.

use crate::error::DomainAvailError;

/// Result of one action attempt.
///
/// `Warning` is a soft stop: when the action declines to retry, the engine
/// hands the caller "no value" instead of failing. `Error` is a hard stop
/// that is still eligible for retry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    Success(V),
    Warning(DomainAvailError),
    Error(DomainAvailError),
}

impl<V> Outcome<V> {
    /// The carried error for `Warning` and `Error`, `None` for `Success`.
    pub fn cause(&self) -> Option<&DomainAvailError> {
        match self {
            Self::Success(_) => None,
            Self::Warning(cause) | Self::Error(cause) => Some(cause),
        }
    }
}
