//! Sparse linear backend, enabled by the `sparse` feature.
//!
//! Factorizes the real Newton block with `faer`'s sparse LU and the
//! complex-pair block by falling back to the dense `nalgebra` path: `faer`'s
//! sparse solvers in this version do not cover `Complex<f64>` coefficients,
//! and the complex system is one-third the size of three stacked real
//! systems anyway, so densifying just that block is cheap.

use nalgebra::{Complex, DMatrix};
use nalgebra_sparse::{CscMatrix, CooMatrix};

use crate::errors::{RadauError, RadauResult};
use crate::linear_solver::{Dense, LinearBackend};
use crate::vector::RVector;

pub struct Sparse;

pub struct SparseRealFactorization {
    lu: faer::sparse::linalg::solvers::Lu<i32, f64>,
    n: usize,
}

fn csc_to_faer(m: &CscMatrix<f64>) -> RadauResult<faer::sparse::SparseColMat<i32, f64>> {
    let nrows = m.nrows();
    let ncols = m.ncols();
    let mut triplets = Vec::with_capacity(m.nnz());
    for (col_idx, col) in m.col_iter().enumerate() {
        for (&row_idx, &value) in col.row_indices().iter().zip(col.values().iter()) {
            triplets.push(faer::sparse::Triplet::new(row_idx as i32, col_idx as i32, value));
        }
    }
    faer::sparse::SparseColMat::try_new_from_triplets(nrows, ncols, &triplets).map_err(|_| {
        RadauError::BackendUnavailable {
            reason: "failed to build faer sparse matrix from CSC pattern".into(),
        }
    })
}

impl LinearBackend for Sparse {
    type RealFactorization = SparseRealFactorization;
    type ComplexFactorization = <Dense as LinearBackend>::ComplexFactorization;

    fn factor_real(matrix: DMatrix<f64>) -> RadauResult<Self::RealFactorization> {
        let n = matrix.nrows();
        let mut coo = CooMatrix::new(n, n);
        for i in 0..n {
            for j in 0..n {
                let v = matrix[(i, j)];
                if v != 0.0 {
                    coo.push(i, j, v);
                }
            }
        }
        let csc = CscMatrix::from(&coo);
        let faer_mat = csc_to_faer(&csc)?;
        let lu = faer_mat
            .sp_lu()
            .map_err(|_| RadauError::LinearSolverSingular { t: f64::NAN })?;
        Ok(SparseRealFactorization { lu, n })
    }

    fn solve_real(fact: &Self::RealFactorization, rhs: &mut RVector) -> RadauResult<()> {
        let mut b = faer::Mat::from_fn(fact.n, 1, |i, _| rhs[i]);
        fact.lu.solve_in_place(b.as_mut());
        for i in 0..fact.n {
            rhs[i] = b[(i, 0)];
        }
        Ok(())
    }

    fn factor_complex(matrix: DMatrix<Complex<f64>>) -> RadauResult<Self::ComplexFactorization> {
        Dense::factor_complex(matrix)
    }

    fn solve_complex(
        fact: &Self::ComplexFactorization,
        rhs: &mut nalgebra::DVector<Complex<f64>>,
    ) -> RadauResult<()> {
        Dense::solve_complex(fact, rhs)
    }
}
