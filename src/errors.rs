use thiserror::Error;

/// Error taxonomy for the integrator.
///
/// Mirrors the failure modes of the original RADAU5 FORTRAN/Python
/// implementation (`IDID` codes in `radau5.py`), surfaced as a typed enum
/// instead of a magic integer.
#[derive(Error, Debug)]
pub enum RadauError {
    #[error("input is not consistent: {reason}")]
    InvalidInput { reason: String },

    #[error("matrix (gamma/h)*M - J is repeatedly singular at t = {t}")]
    LinearSolverSingular { t: f64 },

    #[error("Newton iteration failed to converge at t = {t} with step size h = {h}")]
    NewtonFailed { t: f64, h: f64 },

    #[error("step size became too small at t = {t} (h = {h})")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("maximum number of steps ({maxsteps}) reached without completing the interval")]
    MaxStepsReached { maxsteps: usize },

    #[error("time limit exceeded during the per-step report callback")]
    TimeLimitExceeded,

    #[error("sparse linear solver backend requested but not available: {reason}")]
    BackendUnavailable { reason: String },

    #[error("recoverable error signaled by user callback: {reason}")]
    Recoverable { reason: String },

    #[error("finite-difference Jacobian at t = {t} could not be formed: {reason}")]
    JacobianUnavailable { t: f64, reason: String },

    #[error("user callback raised a non-recoverable error: {source}")]
    NonRecoverable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("interpolate() called outside the span [t_old, t] of the most recently accepted step")]
    InterpolationOutsideCurrentStep,

    #[error("solver state not set; call integrate() before interpolate()/statistics()")]
    StateNotSet,
}

pub type RadauResult<T> = Result<T, RadauError>;
