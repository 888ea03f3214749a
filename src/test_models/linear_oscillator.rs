//! S3: the harmonic oscillator `y'' = -y`, `y(0) = 1`, `y'(0) = 0`, written
//! as the first-order system `y1' = y2, y2' = -y1` and integrated over one
//! full period `[0, 2*pi]`. A non-stiff sanity check that the collocation
//! error control and step controller don't introduce drift on a problem
//! with an exact closed form (`y1(t) = cos(t)`).

use crate::callback::CallbackOutcome;
use crate::op::OdeEquations;
use crate::vector::RVector;
use nalgebra::DMatrix;

pub struct LinearOscillator;

impl OdeEquations for LinearOscillator {
    fn nstates(&self) -> usize {
        2
    }

    fn rhs_inplace(&self, _t: f64, y: &RVector, out: &mut RVector) -> CallbackOutcome<()> {
        out[0] = y[1];
        out[1] = -y[0];
        CallbackOutcome::Ok(())
    }

    fn has_analytic_jacobian(&self) -> bool {
        true
    }

    fn jacobian_inplace(&self, _t: f64, _y: &RVector, out: &mut DMatrix<f64>) {
        out[(0, 0)] = 0.0;
        out[(0, 1)] = 1.0;
        out[(1, 0)] = -1.0;
        out[(1, 1)] = 0.0;
    }
}

pub fn problem() -> (LinearOscillator, f64, RVector) {
    (LinearOscillator, 0.0, RVector::from_vec(vec![1.0, 0.0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RadauOptions;
    use crate::problem::OdeSolverProblem;
    use crate::solver::{Radau5, StepResult};

    #[test]
    fn completes_one_period_close_to_the_starting_state() {
        let (eqn, t0, y0) = problem();
        let mut opts = RadauOptions::default();
        opts.rtol = 1.0e-9;
        opts.atol = 1.0e-9;

        let problem = OdeSolverProblem::new(eqn, t0, y0);
        let mut solver = Radau5::new(problem, opts).unwrap();

        let t_final = std::f64::consts::TAU;
        match solver.integrate(t_final).unwrap() {
            StepResult::Complete { t, y } => {
                assert!((t - t_final).abs() < 1e-8);
                assert!((y[0] - 1.0).abs() < 1e-6, "y1(2*pi)={}", y[0]);
                assert!((y[1] - 0.0).abs() < 1e-6, "y2(2*pi)={}", y[1]);
            }
            StepResult::Event { .. } => panic!("no events expected in this scenario"),
        }
    }
}
