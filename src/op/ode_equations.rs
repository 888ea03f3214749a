//! `OdeEquations`: the capability a user problem implements.
//!
//! Grounded on the teacher's `OdeEquations` trait (used throughout
//! `op/sdirk.rs`, `callable/ode.rs`) which exposes `rhs_inplace`,
//! `jacobian_matrix`, `mass_inplace`; we keep the same inplace-call shape
//! (callers own the output buffer, no per-call heap allocation on the hot
//! path) and the same staleness-free default for a plain ODE (`mass_inplace`
//! defaults to identity).
//!
//! DAE systems (`M*Y' = Phi(t,Y)`) are expressed by overriding `is_dae` and
//! `mass_inplace`, matching the stacked `Y = (y, v)` convention of
//! `Radau5DAE` in the original reference (`radau5.py`): `mass_inplace` zeros
//! out the algebraic block of a candidate derivative rather than the
//! solver needing a separate DAE code path.

use crate::callback::CallbackOutcome;
use crate::vector::RVector;
use nalgebra::DMatrix;

/// The differential equations (or semi-explicit index-1 DAE) being
/// integrated.
pub trait OdeEquations {
    /// Number of state components (`leny`, or `2*leny` for a stacked DAE).
    fn nstates(&self) -> usize;

    /// `out <- f(t, y)`. Returns `CallbackOutcome::Recoverable` when `y`
    /// lies outside `f`'s domain of validity (the caller shrinks `h` and
    /// retries) or `NonRecoverable` to abort the integration outright,
    /// matching spec.md §4.4 step 1 / §7's callback-failure taxonomy.
    fn rhs_inplace(&self, t: f64, y: &RVector, out: &mut RVector) -> CallbackOutcome<()>;

    /// Whether `jacobian_inplace` is implemented; if `false` the integrator
    /// falls back to forward differences (see `jacobian.rs`).
    fn has_analytic_jacobian(&self) -> bool {
        false
    }

    /// `out <- df/dy(t, y)`. Only called when `has_analytic_jacobian()` is
    /// `true`.
    fn jacobian_inplace(&self, _t: f64, _y: &RVector, _out: &mut DMatrix<f64>) {
        unreachable!("jacobian_inplace called without has_analytic_jacobian() == true")
    }

    /// Whether this system carries a non-identity mass matrix (DAE).
    fn is_dae(&self) -> bool {
        false
    }

    /// `out <- M * dy`. Defaults to the identity mass matrix (plain ODE).
    /// A semi-explicit index-1 DAE with mass `diag(I, 0)` overrides this to
    /// zero the algebraic block.
    fn mass_inplace(&self, _t: f64, dy: &RVector, out: &mut RVector) {
        out.copy_from(dy);
    }

    /// Per-component differential index used to scale the error estimate
    /// (spec.md §4.4 step 5); all-ones for a plain ODE.
    fn dae_index(&self) -> Vec<u8> {
        vec![1; self.nstates()]
    }

    /// `out <- M`, the mass matrix itself (as opposed to its action via
    /// `mass_inplace`). Built from `mass_inplace` applied to each unit basis
    /// vector, since the mass action is linear; a plain ODE never takes this
    /// path (`is_dae() == false` short-circuits to the identity). DAE
    /// implementations with a cheap closed form may override this directly
    /// instead of paying for `n` calls to `mass_inplace`.
    fn mass_matrix_inplace(&self, t: f64, out: &mut DMatrix<f64>) {
        let n = self.nstates();
        if !self.is_dae() {
            *out = DMatrix::identity(n, n);
            return;
        }
        let mut e = RVector::zeros(n);
        let mut col = RVector::zeros(n);
        for j in 0..n {
            e[j] = 1.0;
            self.mass_inplace(t, &e, &mut col);
            out.set_column(j, &col);
            e[j] = 0.0;
        }
    }

    /// Number of state-event root functions; `0` disables event location.
    fn nroots(&self) -> usize {
        0
    }

    /// `out <- g(t, y)`, the root/event functions whose sign changes are
    /// bracketed and located by `event_locator.rs`.
    fn event_inplace(&self, _t: f64, _y: &RVector, _out: &mut RVector) {}
}
