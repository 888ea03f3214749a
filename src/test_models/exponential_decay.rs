//! S1: `y' = -y`, `y(0) = 1` on `[0, 5]`.

use crate::callback::CallbackOutcome;
use crate::op::OdeEquations;
use crate::vector::RVector;

pub struct ExponentialDecay;

impl OdeEquations for ExponentialDecay {
    fn nstates(&self) -> usize {
        1
    }

    fn rhs_inplace(&self, _t: f64, y: &RVector, out: &mut RVector) -> CallbackOutcome<()> {
        out[0] = -y[0];
        CallbackOutcome::Ok(())
    }

    fn has_analytic_jacobian(&self) -> bool {
        true
    }

    fn jacobian_inplace(&self, _t: f64, _y: &RVector, out: &mut nalgebra::DMatrix<f64>) {
        out[(0, 0)] = -1.0;
    }
}

pub fn problem() -> (ExponentialDecay, f64, RVector) {
    (ExponentialDecay, 0.0, RVector::from_vec(vec![1.0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RadauOptions;
    use crate::problem::OdeSolverProblem;
    use crate::solver::{Radau5, StepResult};

    #[test]
    fn decays_to_exp_minus_five_within_tolerance() {
        let (eqn, t0, y0) = problem();
        let mut opts = RadauOptions::default();
        opts.rtol = 1.0e-8;
        opts.atol = 1.0e-8;

        let problem = OdeSolverProblem::new(eqn, t0, y0);
        let mut solver = Radau5::new(problem, opts).unwrap();

        match solver.integrate(5.0).unwrap() {
            StepResult::Complete { t, y } => {
                assert!((t - 5.0).abs() < 1e-9);
                let expected = (-5.0_f64).exp();
                assert!((y[0] - expected).abs() < 1e-7, "y(5)={} expected={}", y[0], expected);
            }
            StepResult::Event { .. } => panic!("no events expected in this scenario"),
        }
    }
}
