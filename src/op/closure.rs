//! Closure-based `OdeEquations` for quick problems and tests, grounded on
//! the boxed-closure pattern in `AvalorAI-pilots-intent`'s
//! `backward_euler.rs` (`|x: &DVector<f64>| -> DVector<f64>` passed into a
//! generic `newton()` helper) and the teacher's `UnitCallable`
//! (`callable/unit.rs`), which is the minimal bare-function analogue for a
//! trait-based `Op`.

use nalgebra::DMatrix;

use super::OdeEquations;
use crate::callback::CallbackOutcome;
use crate::vector::RVector;

type RhsFn = Box<dyn Fn(f64, &RVector, &mut RVector) -> CallbackOutcome<()>>;
type JacFn = Box<dyn Fn(f64, &RVector, &mut DMatrix<f64>)>;
type MassFn = Box<dyn Fn(f64, &RVector, &mut RVector)>;
type EventFn = Box<dyn Fn(f64, &RVector, &mut RVector)>;

/// A problem built from plain closures, for scripts, demos, and tests that
/// do not want to define a named type.
pub struct ClosureEquations {
    n: usize,
    rhs: RhsFn,
    jac: Option<JacFn>,
    mass: Option<MassFn>,
    event: Option<EventFn>,
    nroots: usize,
    dae_index: Vec<u8>,
}

impl ClosureEquations {
    pub fn new(n: usize, rhs: impl Fn(f64, &RVector, &mut RVector) -> CallbackOutcome<()> + 'static) -> Self {
        ClosureEquations {
            n,
            rhs: Box::new(rhs),
            jac: None,
            mass: None,
            event: None,
            nroots: 0,
            dae_index: vec![1; n],
        }
    }

    pub fn with_jacobian(mut self, jac: impl Fn(f64, &RVector, &mut DMatrix<f64>) + 'static) -> Self {
        self.jac = Some(Box::new(jac));
        self
    }

    pub fn with_mass(mut self, mass: impl Fn(f64, &RVector, &mut RVector) + 'static, dae_index: Vec<u8>) -> Self {
        self.mass = Some(Box::new(mass));
        self.dae_index = dae_index;
        self
    }

    pub fn with_event(mut self, nroots: usize, event: impl Fn(f64, &RVector, &mut RVector) + 'static) -> Self {
        self.event = Some(Box::new(event));
        self.nroots = nroots;
        self
    }
}

impl OdeEquations for ClosureEquations {
    fn nstates(&self) -> usize {
        self.n
    }

    fn rhs_inplace(&self, t: f64, y: &RVector, out: &mut RVector) -> CallbackOutcome<()> {
        (self.rhs)(t, y, out)
    }

    fn has_analytic_jacobian(&self) -> bool {
        self.jac.is_some()
    }

    fn jacobian_inplace(&self, t: f64, y: &RVector, out: &mut DMatrix<f64>) {
        (self.jac.as_ref().expect("jacobian_inplace called without with_jacobian"))(t, y, out)
    }

    fn is_dae(&self) -> bool {
        self.mass.is_some()
    }

    fn mass_inplace(&self, t: f64, dy: &RVector, out: &mut RVector) {
        match &self.mass {
            Some(mass) => mass(t, dy, out),
            None => out.copy_from(dy),
        }
    }

    fn dae_index(&self) -> Vec<u8> {
        self.dae_index.clone()
    }

    fn nroots(&self) -> usize {
        self.nroots
    }

    fn event_inplace(&self, t: f64, y: &RVector, out: &mut RVector) {
        if let Some(event) = &self.event {
            event(t, y, out)
        }
    }
}
