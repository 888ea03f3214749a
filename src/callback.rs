//! `CallbackOutcome`: formalizes the recoverable/non-recoverable/fatal split
//! the original implements via Python's exception hierarchy
//! (`radau5.py:241-275`, where a recoverable failure in the right-hand side
//! retries with a smaller step and any other exception aborts the
//! integration). Rust has no exceptions, so user callbacks that can fail
//! return this enum directly instead of panicking.

use crate::errors::RadauError;

/// Result of invoking a user-supplied callback (right-hand side, Jacobian,
/// or event function) that may signal a transient failure.
pub enum CallbackOutcome<T> {
    /// The callback succeeded.
    Ok(T),
    /// The callback failed in a way the step controller can recover from by
    /// shrinking the step size and retrying (e.g. the state moved outside
    /// the domain of validity of `f`).
    Recoverable { reason: String },
    /// The callback failed in a way that cannot be worked around; aborts
    /// the integration with a `RadauError::NonRecoverable`.
    NonRecoverable {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl<T> CallbackOutcome<T> {
    /// Converts a non-`Ok` outcome into a `RadauError`, consuming `self`.
    /// Panics if called on `Ok` — callers are expected to match on `Ok`
    /// first and only call this on the failure branches.
    pub fn into_error(self, t: f64, h: f64) -> RadauError {
        match self {
            CallbackOutcome::Ok(_) => panic!("into_error called on CallbackOutcome::Ok"),
            CallbackOutcome::Recoverable { reason } => {
                let _ = (t, h);
                RadauError::Recoverable { reason }
            }
            CallbackOutcome::NonRecoverable { source } => RadauError::NonRecoverable { source },
        }
    }
}
