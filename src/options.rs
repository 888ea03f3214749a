//! User-facing integrator options.
//!
//! Named and defaulted after the options table in spec.md §6, cross-checked
//! against `russell_ode::OdeParams` (`other_examples/..._ode_params.rs.rs`)
//! for the step-controller constants (`fac1`/`fac2`, `quot1`/`quot2`,
//! `thet`), and against the original's `Radau5ODE.__init__` defaults
//! (`radau5.py`) for `maxsteps`/`atol`/`rtol`/`safe`.

use crate::errors::{RadauError, RadauResult};

/// Selects the linear-algebra back end used for the Newton system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearBackendKind {
    Dense,
    #[cfg(feature = "sparse")]
    Sparse,
}

impl Default for LinearBackendKind {
    fn default() -> Self {
        LinearBackendKind::Dense
    }
}

/// Whether the user-supplied analytic Jacobian should be used, or the
/// integrator should fall back to forward differences. Corresponds to
/// spec.md §6's `usejac [auto]` option: `Auto` uses the analytic Jacobian
/// whenever the equations provide one; `ForceFiniteDifference` always
/// evaluates by forward differences even if one is available (and is what
/// a semi-explicit DAE problem resolves to, per the Open Question decision
/// in SPEC_FULL.md §9 — see `solver.rs::Radau5::new`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianSource {
    Auto,
    ForceFiniteDifference,
}

impl Default for JacobianSource {
    fn default() -> Self {
        JacobianSource::Auto
    }
}

#[derive(Debug, Clone)]
pub struct RadauOptions {
    /// Relative tolerance, scalar or applied uniformly; default `1e-6`.
    pub rtol: f64,
    /// Absolute tolerance, scalar or applied uniformly; default `1e-6`.
    pub atol: f64,
    /// Maximum number of accepted+rejected steps before giving up; default `10_000`.
    pub maxsteps: usize,
    /// Initial step size; `None` selects an automatic estimate.
    pub h0: Option<f64>,
    /// Hard ceiling on step size; default `+inf`.
    pub max_h: f64,
    /// Safety factor applied to the predicted step size; default `0.9`.
    pub safe: f64,
    /// Lower clamp on the step-size growth ratio; default `0.2`.
    pub fac1: f64,
    /// Upper clamp on the step-size growth ratio; default `8.0`.
    pub fac2: f64,
    /// Lower hysteresis bound: step ratios inside `[quot1, quot2]` keep `h` unchanged; default `1.0`.
    pub quot1: f64,
    /// Upper hysteresis bound; default `1.2`.
    pub quot2: f64,
    /// Contraction-factor threshold above which the Jacobian/LU are refreshed; default `1e-3` for freshly computed, `1e-1` used directly in `_Radau5ODE`.
    pub thet: f64,
    /// Maximum Newton iterations per factorization; default `7`.
    pub newt: usize,
    /// Requested linear-algebra backend.
    pub linear_backend: LinearBackendKind,
    /// Jacobian evaluation strategy.
    pub jacobian_source: JacobianSource,
    /// Expected nonzero count, required when `linear_backend` is `Sparse`
    /// (used as a capacity hint building the CSC pattern; see
    /// `linear_solver::sparse`). Ignored by the dense backend.
    pub nnz: Option<usize>,
    /// Advisory thread-count hint passed to the sparse backend.
    pub num_threads: usize,
}

impl Default for RadauOptions {
    fn default() -> Self {
        RadauOptions {
            rtol: 1.0e-6,
            atol: 1.0e-6,
            maxsteps: 10_000,
            h0: None,
            max_h: f64::INFINITY,
            safe: 0.9,
            fac1: 0.2,
            fac2: 8.0,
            quot1: 1.0,
            quot2: 1.2,
            thet: 1.0e-3,
            newt: 7,
            linear_backend: LinearBackendKind::default(),
            jacobian_source: JacobianSource::default(),
            nnz: None,
            num_threads: 1,
        }
    }
}

impl RadauOptions {
    /// Validates mutually-consistent, range-bound options, mirroring the
    /// setter-time validation the original performs property by property
    /// (e.g. `_set_max_steps`, `ode.py:61-81`).
    pub fn validate(&self) -> RadauResult<()> {
        if self.maxsteps == 0 {
            return Err(RadauError::InvalidInput {
                reason: "maxsteps must be a positive integer".into(),
            });
        }
        if self.rtol <= 0.0 || self.atol < 0.0 {
            return Err(RadauError::InvalidInput {
                reason: "rtol must be positive and atol must be non-negative".into(),
            });
        }
        if self.fac1 >= self.fac2 {
            return Err(RadauError::InvalidInput {
                reason: "fac1 must be smaller than fac2".into(),
            });
        }
        if self.quot1 > self.quot2 {
            return Err(RadauError::InvalidInput {
                reason: "quot1 must not exceed quot2".into(),
            });
        }
        if self.safe <= 0.0 || self.safe >= 1.0 {
            return Err(RadauError::InvalidInput {
                reason: "safe must lie strictly between 0 and 1".into(),
            });
        }
        if let Some(h0) = self.h0 {
            if h0 <= 0.0 {
                return Err(RadauError::InvalidInput {
                    reason: "h0 must be positive".into(),
                });
            }
        }
        if self.newt == 0 {
            return Err(RadauError::InvalidInput {
                reason: "newt must be a positive integer".into(),
            });
        }
        if let Some(nnz) = self.nnz {
            if nnz == 0 {
                return Err(RadauError::InvalidInput {
                    reason: "nnz must be positive when given".into(),
                });
            }
        }
        Ok(())
    }

    /// `fnewt`, the Newton-convergence tolerance, computed from `rtol` per
    /// the formula in spec.md §4.4: `max(10*eps/rtol, min(0.03, sqrt(rtol)))`.
    pub fn fnewt(&self) -> f64 {
        let eps = f64::EPSILON;
        (10.0 * eps / self.rtol).max(0.03_f64.min(self.rtol.sqrt()))
    }
}
