//! Linear algebra back end for the Newton system.
//!
//! The teacher keeps linear solving behind a small `Solver`/`LU` seam
//! (`linear_solver/mod.rs`, `linear_solver/lu.rs`) so BDF can swap in GMRES
//! for large sparse systems without touching the nonlinear solver. We keep
//! the same seam: `LinearBackend` is implemented by `Dense` (always
//! available, `nalgebra::LU`) and, behind the `sparse` feature, `Sparse`
//! (`nalgebra_sparse` CSC + `faer` factorization).
//!
//! Radau's block-diagonalized Newton system needs two factorizations per
//! Jacobian update: one real `(gamma/h)*M - J` system and one complex-pair
//! `(alpha +/- i*beta)/h*M - J` system. We solve the complex system as a
//! single `Complex<f64>`-valued factorization rather than splitting real and
//! imaginary parts into two real solves, per the design notes: nalgebra's
//! `ComplexField` impl for `num_complex::Complex<f64>` makes this free.

use nalgebra::{Complex, DMatrix, LU};

use crate::errors::{RadauError, RadauResult};
use crate::vector::RVector;

/// Pluggable factorize-and-solve backend for the real block of the Newton
/// system. `Dense` is the default; `Sparse` is enabled by the `sparse`
/// feature and falls back to `Dense` with a logged warning when the problem
/// has no analytic sparsity pattern (see `jacobian.rs`).
pub trait LinearBackend {
    /// Opaque factorization handle, kept so repeated solves against the same
    /// Jacobian (the common case between Newton iterations) reuse the LU.
    type RealFactorization;
    type ComplexFactorization;

    fn factor_real(matrix: DMatrix<f64>) -> RadauResult<Self::RealFactorization>;
    fn solve_real(fact: &Self::RealFactorization, rhs: &mut RVector) -> RadauResult<()>;

    fn factor_complex(matrix: DMatrix<Complex<f64>>) -> RadauResult<Self::ComplexFactorization>;
    fn solve_complex(
        fact: &Self::ComplexFactorization,
        rhs: &mut nalgebra::DVector<Complex<f64>>,
    ) -> RadauResult<()>;
}

/// Dense LU factorization via `nalgebra::LU`, mirroring the teacher's
/// `linear_solver::lu::LU<T>` wrapper.
pub struct Dense;

impl LinearBackend for Dense {
    type RealFactorization = LU<f64, nalgebra::Dyn, nalgebra::Dyn>;
    type ComplexFactorization = LU<Complex<f64>, nalgebra::Dyn, nalgebra::Dyn>;

    fn factor_real(matrix: DMatrix<f64>) -> RadauResult<Self::RealFactorization> {
        let lu = matrix.lu();
        if lu.u().diagonal().iter().any(|d| *d == 0.0) {
            return Err(RadauError::LinearSolverSingular { t: f64::NAN });
        }
        Ok(lu)
    }

    fn solve_real(fact: &Self::RealFactorization, rhs: &mut RVector) -> RadauResult<()> {
        let solved = fact
            .solve(&*rhs)
            .ok_or(RadauError::LinearSolverSingular { t: f64::NAN })?;
        rhs.copy_from(&solved);
        Ok(())
    }

    fn factor_complex(matrix: DMatrix<Complex<f64>>) -> RadauResult<Self::ComplexFactorization> {
        let lu = matrix.lu();
        Ok(lu)
    }

    fn solve_complex(
        fact: &Self::ComplexFactorization,
        rhs: &mut nalgebra::DVector<Complex<f64>>,
    ) -> RadauResult<()> {
        let solved = fact
            .solve(&*rhs)
            .ok_or(RadauError::LinearSolverSingular { t: f64::NAN })?;
        rhs.copy_from(&solved);
        Ok(())
    }
}

#[cfg(feature = "sparse")]
pub mod sparse;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_real_solve_matches_known_system() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]);
        let fact = Dense::factor_real(m).unwrap();
        let mut rhs = RVector::from_vec(vec![4.0, 6.0]);
        Dense::solve_real(&fact, &mut rhs).unwrap();
        assert!((rhs[0] - 2.0).abs() < 1e-12);
        assert!((rhs[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn dense_complex_solve_matches_known_system() {
        let m = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex::new(1.0, 1.0),
                Complex::new(0.0, 0.0),
                Complex::new(0.0, 0.0),
                Complex::new(1.0, -1.0),
            ],
        );
        let fact = Dense::factor_complex(m).unwrap();
        let mut rhs = nalgebra::DVector::from_vec(vec![Complex::new(2.0, 2.0), Complex::new(2.0, -2.0)]);
        Dense::solve_complex(&fact, &mut rhs).unwrap();
        assert!((rhs[0] - Complex::new(2.0, 0.0)).norm() < 1e-10);
        assert!((rhs[1] - Complex::new(2.0, 0.0)).norm() < 1e-10);
    }
}
