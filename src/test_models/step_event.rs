//! S4: `y' = 1`, `y(0) = 0` on `[0, 1]`, with a single root function
//! `g(t, y) = y - 0.5` that crosses zero at `t = 0.5`. Exercises
//! `event_locator` end to end: a linear solution makes the expected
//! crossing time exact, so the bisection refinement has nothing to hide
//! behind.

use crate::callback::CallbackOutcome;
use crate::op::OdeEquations;
use crate::vector::RVector;

pub struct StepEvent;

impl OdeEquations for StepEvent {
    fn nstates(&self) -> usize {
        1
    }

    fn rhs_inplace(&self, _t: f64, _y: &RVector, out: &mut RVector) -> CallbackOutcome<()> {
        out[0] = 1.0;
        CallbackOutcome::Ok(())
    }

    fn has_analytic_jacobian(&self) -> bool {
        true
    }

    fn jacobian_inplace(&self, _t: f64, _y: &RVector, out: &mut nalgebra::DMatrix<f64>) {
        out[(0, 0)] = 0.0;
    }

    fn nroots(&self) -> usize {
        1
    }

    fn event_inplace(&self, _t: f64, y: &RVector, out: &mut RVector) {
        out[0] = y[0] - 0.5;
    }
}

pub fn problem() -> (StepEvent, f64, RVector) {
    (StepEvent, 0.0, RVector::from_vec(vec![0.0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RadauOptions;
    use crate::problem::OdeSolverProblem;
    use crate::solver::{Radau5, StepResult};

    #[test]
    fn locates_the_crossing_at_one_half() {
        let (eqn, t0, y0) = problem();
        let mut opts = RadauOptions::default();
        opts.rtol = 1.0e-9;
        opts.atol = 1.0e-9;
        opts.max_h = 0.05;

        let problem = OdeSolverProblem::new(eqn, t0, y0);
        let mut solver = Radau5::new(problem, opts).unwrap();

        match solver.integrate(1.0).unwrap() {
            StepResult::Event { t, y, crossings } => {
                assert!((t - 0.5).abs() < 1e-6, "event located at t={t}");
                assert!((y[0] - 0.5).abs() < 1e-4, "y at event={}", y[0]);
                assert_eq!(crossings.len(), 1);
                assert_eq!(crossings[0].root_index, 0);
            }
            StepResult::Complete { .. } => panic!("expected a located event before t=1"),
        }
    }
}
