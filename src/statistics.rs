//! Run statistics, surfaced to users the way the teacher surfaces solver
//! counters (`get_statistics()` / `insta::assert_yaml_snapshot!` in
//! `ode_solver/mod.rs`).

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub n_steps: usize,
    pub n_accepted: usize,
    pub n_rejected: usize,
    pub n_rhs_evals: usize,
    pub n_jac_evals: usize,
    pub n_mass_evals: usize,
    pub n_lu_factorizations: usize,
    pub n_newton_iterations: usize,
    pub n_newton_failures: usize,
    pub n_event_function_evals: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }
}
