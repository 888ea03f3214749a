//! S2: Van der Pol oscillator with `mu = 1e3`, `y0 = (2, 0)` on `[0, 3000]`.
//! The textbook stiff test problem for Radau-family methods; present in
//! essentially every reference implementation of this algorithm (Hairer &
//! Wanner's own RADAU5 test driver included).

use crate::callback::CallbackOutcome;
use crate::op::OdeEquations;
use crate::vector::RVector;
use nalgebra::DMatrix;

pub struct VanDerPol {
    pub mu: f64,
}

impl OdeEquations for VanDerPol {
    fn nstates(&self) -> usize {
        2
    }

    fn rhs_inplace(&self, _t: f64, y: &RVector, out: &mut RVector) -> CallbackOutcome<()> {
        out[0] = y[1];
        out[1] = self.mu * ((1.0 - y[0] * y[0]) * y[1] - y[0]);
        CallbackOutcome::Ok(())
    }

    fn has_analytic_jacobian(&self) -> bool {
        true
    }

    fn jacobian_inplace(&self, _t: f64, y: &RVector, out: &mut DMatrix<f64>) {
        out[(0, 0)] = 0.0;
        out[(0, 1)] = 1.0;
        out[(1, 0)] = self.mu * (-2.0 * y[0] * y[1] - 1.0);
        out[(1, 1)] = self.mu * (1.0 - y[0] * y[0]);
    }
}

pub fn problem() -> (VanDerPol, f64, RVector) {
    (VanDerPol { mu: 1.0e3 }, 0.0, RVector::from_vec(vec![2.0, 0.0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RadauOptions;
    use crate::problem::OdeSolverProblem;
    use crate::solver::{Radau5, StepResult};

    #[test]
    fn completes_within_step_budget_and_reuses_lu_factorizations() {
        let (eqn, t0, y0) = problem();
        let mut opts = RadauOptions::default();
        opts.rtol = 1.0e-8;
        opts.atol = 1.0e-8;
        opts.maxsteps = 5000;

        let problem = OdeSolverProblem::new(eqn, t0, y0);
        let mut solver = Radau5::new(problem, opts).unwrap();

        let result = solver.integrate(3000.0).unwrap();
        match result {
            StepResult::Complete { t, .. } => assert!((t - 3000.0).abs() < 1e-6),
            StepResult::Event { .. } => panic!("van der Pol has no events"),
        }

        let stats = solver.statistics();
        assert!(stats.n_steps <= 2000, "nsteps={}", stats.n_steps);
        assert!(stats.n_lu_factorizations <= stats.n_steps + stats.n_rejected);
    }
}
