//! S6: a linear, constant-coefficient stiff problem with an analytic
//! Jacobian, on `[0, 100]`. Since the system is linear the Newton
//! contraction factor is tiny on every step, so `reuse_policy` should keep
//! refreshing the Jacobian/LU only rarely rather than every step — this is
//! the scenario that exercises that reuse path rather than the step
//! controller or event machinery.

use crate::callback::CallbackOutcome;
use crate::op::OdeEquations;
use crate::vector::RVector;
use nalgebra::DMatrix;

const LAMBDA_FAST: f64 = -1000.0;
const LAMBDA_SLOW: f64 = -1.0;

pub struct JacobianReuseStiff;

impl OdeEquations for JacobianReuseStiff {
    fn nstates(&self) -> usize {
        2
    }

    fn rhs_inplace(&self, _t: f64, y: &RVector, out: &mut RVector) -> CallbackOutcome<()> {
        out[0] = LAMBDA_SLOW * y[0];
        out[1] = LAMBDA_FAST * y[1];
        CallbackOutcome::Ok(())
    }

    fn has_analytic_jacobian(&self) -> bool {
        true
    }

    fn jacobian_inplace(&self, _t: f64, _y: &RVector, out: &mut DMatrix<f64>) {
        out[(0, 0)] = LAMBDA_SLOW;
        out[(0, 1)] = 0.0;
        out[(1, 0)] = 0.0;
        out[(1, 1)] = LAMBDA_FAST;
    }
}

pub fn problem() -> (JacobianReuseStiff, f64, RVector) {
    (JacobianReuseStiff, 0.0, RVector::from_vec(vec![1.0, 1.0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RadauOptions;
    use crate::problem::OdeSolverProblem;
    use crate::solver::{Radau5, StepResult};

    #[test]
    fn reuses_the_jacobian_across_most_steps() {
        let (eqn, t0, y0) = problem();
        let mut opts = RadauOptions::default();
        opts.rtol = 1.0e-7;
        opts.atol = 1.0e-7;
        opts.maxsteps = 20_000;

        let problem = OdeSolverProblem::new(eqn, t0, y0);
        let mut solver = Radau5::new(problem, opts).unwrap();

        let result = solver.integrate(100.0).unwrap();
        match result {
            StepResult::Complete { t, y } => {
                assert!((t - 100.0).abs() < 1e-6);
                assert!(y[0].abs() < 1e-10 || y[0].is_finite());
            }
            StepResult::Event { .. } => panic!("no events expected in this scenario"),
        }

        let stats = solver.statistics();
        assert!(stats.n_steps > 0);
        assert!(
            stats.n_jac_evals <= stats.n_steps / 5 + 1,
            "njacs={} nsteps={}",
            stats.n_jac_evals,
            stats.n_steps
        );
    }
}
