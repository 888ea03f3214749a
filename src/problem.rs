//! Problem descriptor: equations plus initial data, mirroring the teacher's
//! `OdeSolverProblem<Eqn>` (`ode_solver/mod.rs`), generic over the user's
//! `OdeEquations` implementation rather than over `Matrix`/`Vector` type
//! parameters — the only backend SPEC_FULL.md asks for is `f64`/`DVector`.

use crate::op::OdeEquations;
use crate::vector::RVector;

pub struct OdeSolverProblem<Eqn: OdeEquations> {
    pub eqn: Eqn,
    pub t0: f64,
    pub y0: RVector,
}

impl<Eqn: OdeEquations> OdeSolverProblem<Eqn> {
    pub fn new(eqn: Eqn, t0: f64, y0: RVector) -> Self {
        assert_eq!(
            y0.len(),
            eqn.nstates(),
            "initial state length does not match the number of equations"
        );
        OdeSolverProblem { eqn, t0, y0 }
    }

    pub fn nstates(&self) -> usize {
        self.eqn.nstates()
    }
}
