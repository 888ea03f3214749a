//! Simplified-Newton iteration on the block-diagonalized collocation system.
//!
//! Grounded directly on `newton()` in the original reference
//! (`radau5.py:689-790`): the same 20-restart outer loop, the same
//! Deuflhard contraction-factor (`theta`/`fac_con`) convergence monitor, and
//! the same `dyth` slow-convergence abort test. The only structural
//! difference is the linear algebra: the original solves three separate
//! real `LU` systems (one per eigenvalue of `A^-1`); we solve one real
//! system (`gamma`) and one complex system (`alpha +/- i*beta`) instead,
//! per the design notes — `nalgebra`'s `ComplexField` support makes the
//! complex LU as cheap to express as the real one.

use nalgebra::{Complex, DMatrix, Matrix3, Vector3};

use crate::callback::CallbackOutcome;
use crate::coefficients::RadauCoefficients;
use crate::errors::RadauError;
use crate::linear_solver::LinearBackend;
use crate::op::OdeEquations;
use crate::statistics::Statistics;
use crate::vector::RVector;

const MAX_NEWTON_RESTARTS: usize = 20;

/// The three collocation stage increments `Z1, Z2, Z3` (each length `n`),
/// i.e. `Y_i = y + Z_i`.
pub struct StageValues {
    pub z1: RVector,
    pub z2: RVector,
    pub z3: RVector,
}

impl StageValues {
    pub fn zeros(n: usize) -> Self {
        StageValues {
            z1: RVector::zeros(n),
            z2: RVector::zeros(n),
            z3: RVector::zeros(n),
        }
    }
}

pub struct NewtonOutcome {
    pub z: StageValues,
    pub theta: f64,
    pub fac_con: f64,
    /// `Some(h)` when the iteration wants a specific shrunk step size before
    /// retrying (the `dyth` slow-convergence branch), as opposed to the
    /// generic step-halving the caller applies on outright non-convergence.
    pub suggested_h: Option<f64>,
    /// Number of inner iterations taken on the restart attempt that
    /// converged, i.e. `self._curiter` in the original — feeds the step
    /// controller's `(2N+1)/(2N+it)` damping term.
    pub iterations_used: usize,
}

pub enum NewtonFailure {
    /// Iteration diverged or ran out of restarts; caller should halve `h`
    /// and, if the Jacobian was not already current, refresh it before
    /// retrying.
    NotConverged,
    /// The right-hand side raised an error that cannot be worked around by
    /// shrinking the step; caller should abort the integration with this.
    NonRecoverable(RadauError),
}

/// Outcome of checking a stage right-hand-side evaluation inside the Newton
/// inner loop.
enum RhsCheck {
    Ok,
    /// Treat like a failed contraction-factor check: break the inner loop
    /// and let the outer restart loop try again, same as the original's
    /// "retry with a smaller step" policy for recoverable right-hand-side
    /// errors.
    BreakRestart,
    Abort(RadauError),
}

fn check_rhs(outcome: CallbackOutcome<()>) -> RhsCheck {
    match outcome {
        CallbackOutcome::Ok(()) => RhsCheck::Ok,
        CallbackOutcome::Recoverable { .. } => RhsCheck::BreakRestart,
        non_recoverable @ CallbackOutcome::NonRecoverable { .. } => {
            RhsCheck::Abort(non_recoverable.into_error(0.0, 0.0))
        }
    }
}

/// Runs the simplified-Newton iteration for one attempted step from `(t, y)`
/// with step size `h`, given a Jacobian already evaluated at `(t, y)`.
#[allow(clippy::too_many_arguments)]
pub fn newton_iterate<Eqn: OdeEquations, B: LinearBackend>(
    eqn: &Eqn,
    t: f64,
    y: &RVector,
    h: f64,
    jac: &DMatrix<f64>,
    mass: &DMatrix<f64>,
    coeffs: &RadauCoefficients,
    scale: &RVector,
    fnewt: f64,
    newt_max: usize,
    start: StageValues,
    stats: &mut Statistics,
) -> Result<NewtonOutcome, NewtonFailure> {
    let n = y.len();
    let eps = f64::EPSILON;

    let g = coeffs.gamma / h;
    let a = coeffs.alpha / h;
    let b = coeffs.beta / h;

    let real_matrix = mass * g - jac;
    let real_fact = B::factor_real(real_matrix).map_err(|_| NewtonFailure::NotConverged)?;

    let complex_matrix =
        jac.map(|v| Complex::new(-v, 0.0)) + mass.map(|v| Complex::new(v, 0.0)) * Complex::new(a, b);
    let complex_fact =
        B::factor_complex(complex_matrix).map_err(|_| NewtonFailure::NotConverged)?;
    stats.n_lu_factorizations += 1;

    let mut fac_con = f64::max(1.0e-2, eps).powf(0.8);
    let mut theta = initial_theta();

    let mut f1 = RVector::zeros(n);
    let mut f2 = RVector::zeros(n);
    let mut f3 = RVector::zeros(n);

    for _restart in 0..MAX_NEWTON_RESTARTS {
        // Fresh starting values and convergence monitor for every restart
        // attempt, matching `Z, W = self.calc_start_values()` being called
        // anew on each pass rather than carrying state across restarts.
        let mut z = StageValues {
            z1: start.z1.clone(),
            z2: start.z2.clone(),
            z3: start.z3.clone(),
        };
        let mut w = stage_to_w(&z.z1, &z.z2, &z.z3, &coeffs.tinv);
        let mut h_suggestion = None;
        let mut old_norm = 0.0f64;
        let mut thq_old = 0.0f64;

        let mut converged = false;
        let mut diverged = false;
        let mut iterations_used = 0usize;

        for i in 0..newt_max {
            stats.n_newton_iterations += 1;

            let stage_rhs = [
                eqn.rhs_inplace(t + coeffs.c[0] * h, &(y + &z.z1), &mut f1),
                eqn.rhs_inplace(t + coeffs.c[1] * h, &(y + &z.z2), &mut f2),
                eqn.rhs_inplace(t + coeffs.c[2] * h, &(y + &z.z3), &mut f3),
            ];
            stats.n_rhs_evals += 3;

            let mut rhs_broke_restart = false;
            for outcome in stage_rhs {
                match check_rhs(outcome) {
                    RhsCheck::Ok => {}
                    RhsCheck::BreakRestart => {
                        stats.n_newton_failures += 1;
                        rhs_broke_restart = true;
                    }
                    RhsCheck::Abort(err) => return Err(NewtonFailure::NonRecoverable(err)),
                }
            }
            if rhs_broke_restart {
                diverged = true;
                break;
            }

            let mut rhs_w = stage_to_w(&f1, &f2, &f3, &coeffs.tinv);

            // Subtract the linear terms g*W0 and (a+ib)*Wc, then solve the
            // two decoupled factorizations.
            for k in 0..n {
                rhs_w.0[k] -= g * w.0[k];
            }
            let mut rhs_complex = nalgebra::DVector::from_fn(n, |k, _| {
                Complex::new(rhs_w.1[k], rhs_w.2[k]) - Complex::new(a, b) * Complex::new(w.1[k], w.2[k])
            });

            let mut rhs_real = RVector::from_iterator(n, rhs_w.0.iter().copied());
            B::solve_real(&real_fact, &mut rhs_real).map_err(|_| NewtonFailure::NotConverged)?;
            B::solve_complex(&complex_fact, &mut rhs_complex)
                .map_err(|_| NewtonFailure::NotConverged)?;

            let delta_w0 = rhs_real;
            let delta_w1 = RVector::from_iterator(n, rhs_complex.iter().map(|c| c.re));
            let delta_w2 = RVector::from_iterator(n, rhs_complex.iter().map(|c| c.im));

            let new_norm = combined_rms_norm(&delta_w0, &delta_w1, &delta_w2, scale);

            if i > 0 {
                let thq = new_norm / old_norm;
                theta = if i == 1 {
                    thq
                } else {
                    (thq * thq_old).sqrt()
                };
                thq_old = thq;

                if theta < 0.99 {
                    fac_con = theta / (1.0 - theta);
                    let remaining = (newt_max as i32 - (i as i32 + 1) - 1).max(0) as i32;
                    let dyth = fac_con * new_norm * theta.powi(remaining) / fnewt;
                    if dyth >= 1.0 {
                        let qnewt = dyth.clamp(1.0e-4, 20.0);
                        h_suggestion = Some(
                            0.8 * qnewt.powf(-1.0 / (4.0 + newt_max as f64 - (i as f64 + 1.0) - 1.0)) * h,
                        );
                        diverged = true;
                        break;
                    }
                } else {
                    diverged = true;
                    break;
                }
            }

            old_norm = new_norm.max(eps);
            w.0 += &delta_w0;
            w.1 += &delta_w1;
            w.2 += &delta_w2;

            let (nz1, nz2, nz3) = w_to_stage(&w, &coeffs.t);
            z.z1 = nz1;
            z.z2 = nz2;
            z.z3 = nz3;

            iterations_used = i + 1;

            if fac_con * new_norm <= fnewt {
                converged = true;
                break;
            }
        }

        if converged {
            return Ok(NewtonOutcome {
                z,
                theta,
                fac_con,
                suggested_h: h_suggestion,
                iterations_used,
            });
        }
        let _ = diverged;
        stats.n_newton_failures += 1;
    }

    Err(NewtonFailure::NotConverged)
}

fn initial_theta() -> f64 {
    #[allow(clippy::let_and_return)]
    // `self._theta = abs(self.thet)` at the top of each restart in the
    // original; the actual `thet` option value is applied by the caller
    // when deciding whether to reuse the Jacobian, so this just seeds the
    // monitor with a value guaranteed to request at least one iteration.
    1.0
}

/// `W = (Tinv kron I) Z`, computed per-component rather than materializing
/// the `3n x 3n` Kronecker product: for each state index `i`, the 3-vector
/// `(z1_i, z2_i, z3_i)` is transformed by the 3x3 `Tinv` matrix.
fn stage_to_w(z1: &RVector, z2: &RVector, z3: &RVector, tinv: &Matrix3<f64>) -> (RVector, RVector, RVector) {
    let n = z1.len();
    let mut w0 = RVector::zeros(n);
    let mut w1 = RVector::zeros(n);
    let mut w2 = RVector::zeros(n);
    for i in 0..n {
        let v = Vector3::new(z1[i], z2[i], z3[i]);
        let w = tinv * v;
        w0[i] = w[0];
        w1[i] = w[1];
        w2[i] = w[2];
    }
    (w0, w1, w2)
}

fn w_to_stage(w: &(RVector, RVector, RVector), t: &Matrix3<f64>) -> (RVector, RVector, RVector) {
    let n = w.0.len();
    let mut z1 = RVector::zeros(n);
    let mut z2 = RVector::zeros(n);
    let mut z3 = RVector::zeros(n);
    for i in 0..n {
        let v = Vector3::new(w.0[i], w.1[i], w.2[i]);
        let z = t * v;
        z1[i] = z[0];
        z2[i] = z[1];
        z3[i] = z[2];
    }
    (z1, z2, z3)
}

/// Frobenius norm of the stacked `(w0, w1, w2)` increments, scaled
/// component-wise by `scale` and normalized by `sqrt(3n)`, matching
/// `N.linalg.norm(Z.reshape(-1,leny)/self._scaling,'fro')/N.sqrt(3.*leny)`.
fn combined_rms_norm(w0: &RVector, w1: &RVector, w2: &RVector, scale: &RVector) -> f64 {
    let n = w0.len();
    let mut sum_sq = 0.0;
    for i in 0..n {
        sum_sq += (w0[i] / scale[i]).powi(2);
        sum_sq += (w1[i] / scale[i]).powi(2);
        sum_sq += (w2[i] / scale[i]).powi(2);
    }
    (sum_sq / (3.0 * n as f64)).sqrt()
}
