//! State-event (root) detection and bisection.
//!
//! Grounded on the `_solout`/event dispatch pattern in the original
//! reference (`radau5.py:288-332`) and the `rootsfound[]` trace recorded in
//! the teacher's `robertson.rs` test-model comments (a real Sundials IDA
//! run hitting the same kind of sign-change event). Bracketing is done
//! directly against the collocation polynomial from `continuous_output.rs`
//! rather than delegating to a Fortran/C layer, since there is no such
//! layer here.

use crate::continuous_output::CollocationPolynomial;
use crate::op::OdeEquations;
use crate::vector::RVector;

/// Per-root sign-change classification, matching the `event_info` convention
/// used throughout the original (`-1`: falling through zero, `0`: no
/// crossing, `+1`: rising through zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDirection {
    Falling,
    Rising,
}

pub struct EventCrossing {
    pub root_index: usize,
    pub direction: EventDirection,
    pub t: f64,
}

const BISECTION_MAX_ITER: usize = 50;
const BISECTION_TOL: f64 = 1.0e-10;

/// Scans the `nroots` event functions for sign changes between `t_old` and
/// `t_new`, using the step's continuous-output polynomial (anchored at the
/// accepted state `y_c`, at the end of the step) to evaluate `g` at interior
/// points during bisection. Returns the crossings found, sorted by time —
/// there can be more than one root function crossing within a single
/// accepted step.
pub fn locate_events<Eqn: OdeEquations>(
    eqn: &Eqn,
    t_old: f64,
    t_new: f64,
    g_old: &RVector,
    y_new: &RVector,
    poly: &CollocationPolynomial,
    y_c: &RVector,
    h_old: f64,
) -> Vec<EventCrossing> {
    let nroots = eqn.nroots();
    if nroots == 0 {
        return Vec::new();
    }

    let mut g_new = RVector::zeros(nroots);
    eqn.event_inplace(t_new, y_new, &mut g_new);

    let mut crossings = Vec::new();
    for k in 0..nroots {
        // A crossing is a sign change, or either endpoint landing exactly on
        // zero while the other is non-zero (the step boundary coincides with
        // the root); two zero endpoints in a row is not a crossing.
        let crossed = if g_old[k] == 0.0 && g_new[k] == 0.0 {
            false
        } else if g_old[k] == 0.0 || g_new[k] == 0.0 {
            g_new[k] != g_old[k]
        } else {
            g_old[k].signum() != g_new[k].signum()
        };
        if !crossed {
            continue;
        }
        let direction = if g_old[k] < 0.0 || (g_old[k] == 0.0 && g_new[k] > 0.0) {
            EventDirection::Rising
        } else {
            EventDirection::Falling
        };
        let t_root = bisect_root(eqn, k, t_old, t_new, g_old[k], poly, y_c, h_old);
        crossings.push(EventCrossing {
            root_index: k,
            direction,
            t: t_root,
        });
    }
    crossings.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
    crossings
}

#[allow(clippy::too_many_arguments)]
fn bisect_root<Eqn: OdeEquations>(
    eqn: &Eqn,
    root_index: usize,
    mut t_lo: f64,
    mut t_hi: f64,
    g_lo_sign: f64,
    poly: &CollocationPolynomial,
    y_c: &RVector,
    h_old: f64,
) -> f64 {
    let mut g_buf = RVector::zeros(eqn.nroots());
    let sign_lo = g_lo_sign.signum();

    for _ in 0..BISECTION_MAX_ITER {
        let t_mid = 0.5 * (t_lo + t_hi);
        if (t_hi - t_lo).abs() < BISECTION_TOL {
            break;
        }
        let s = (t_mid - t_hi) / h_old;
        let y_mid = poly.evaluate(y_c, s);
        eqn.event_inplace(t_mid, &y_mid, &mut g_buf);
        if g_buf[root_index] == 0.0 {
            return t_mid;
        }
        if g_buf[root_index].signum() == sign_lo {
            t_lo = t_mid;
        } else {
            t_hi = t_mid;
        }
    }
    0.5 * (t_lo + t_hi)
}
