//! The user-facing problem surface: the `OdeEquations` trait plus a
//! closure-based convenience wrapper, mirroring two patterns seen across the
//! pack — the teacher's trait-object equations (`op/sdirk.rs`,
//! `ode_solver::equations::OdeEquations`) for users who want to implement a
//! type once, and the boxed-closure style used by
//! `AvalorAI-pilots-intent`'s `backward_euler.rs` for throwaway problems and
//! tests.

pub mod closure;
pub mod ode_equations;

pub use ode_equations::OdeEquations;
