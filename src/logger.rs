//! Logging capability.
//!
//! The original reference threads a `verbosity` enum (`QUIET`..`SCREAM`,
//! `ode.py:163-242`) through every print statement. We keep the same five
//! levels conceptually but route them through the `log` crate's facade
//! (`log::Level`) instead of a bespoke printer, matching the closest-domain
//! Rust peer (`ida-rs`, which depends directly on `log`). Unlike the
//! original's module-level `print_verbos`, the integrator never reaches for
//! global mutable state: callers inject a `Logger` capability, and the
//! default simply forwards to the `log` crate's global dispatcher (which a
//! binary wires up with `env_logger` or any other `log::Log` implementation).

use log::Level;

pub trait Logger {
    fn log(&self, level: Level, message: &str);
}

/// Forwards to the ambient `log` crate facade. This is what `Radau5::new`
/// uses unless the caller supplies a different `Logger`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeLogger;

impl Logger for FacadeLogger {
    fn log(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}

/// Discards everything; useful in tests that assert on return values only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}
