//! Fixed Radau IIA (5th order, 3-stage) Butcher tableau and the real/complex
//! eigendecomposition of `A^-1` used to block-diagonalize the Newton system.
//!
//! Grounded directly on `_load_parameters` in the original reference
//! (`radau5.py:878-940`): same `sqrt(6)`-derived constants, same `A`/`B`/`C`/
//! `E` tables, same reordering of the eigenvalues of `A^-1` into one real
//! eigenvalue `gamma` and one complex-conjugate pair `alpha +/- i*beta`, with
//! `T`/`Tinv` the corresponding eigenvector change-of-basis matrices.

use nalgebra::{Complex, Matrix3, Vector3};
use std::sync::OnceLock;

/// Constant collocation data for the 3-stage Radau IIA method. Computed once
/// (`sqrt` is not `const fn`) and cached in a `OnceLock`.
pub struct RadauCoefficients {
    /// Runge-Kutta matrix `A` (3x3).
    pub a: Matrix3<f64>,
    /// Collocation nodes `c1 < c2 < c3 = 1`.
    pub c: Vector3<f64>,
    /// Embedded error-estimation weights.
    pub e: Vector3<f64>,
    /// Real eigenvalue of `A^-1`.
    pub gamma: f64,
    /// Real part of the complex-conjugate eigenvalue pair of `A^-1`.
    pub alpha: f64,
    /// Imaginary part of the complex-conjugate eigenvalue pair of `A^-1`.
    pub beta: f64,
    /// Change-of-basis matrix diagonalizing `A^-1` into `diag(gamma, [alpha -beta; beta alpha])`.
    pub t: Matrix3<f64>,
    /// Inverse of `t`.
    pub tinv: Matrix3<f64>,
}

static COEFFICIENTS: OnceLock<RadauCoefficients> = OnceLock::new();

/// Returns the process-wide singleton coefficient table, computing it on
/// first use.
pub fn coefficients() -> &'static RadauCoefficients {
    COEFFICIENTS.get_or_init(load_parameters)
}

fn load_parameters() -> RadauCoefficients {
    let sq6 = 6f64.sqrt();

    let c1 = (4.0 - sq6) / 10.0;
    let c2 = (4.0 + sq6) / 10.0;
    let c3 = 1.0;

    // Coefficients of the collocation method, as tabulated in Hairer &
    // Wanner (and reproduced verbatim by the original reference).
    let a = Matrix3::new(
        (88.0 - 7.0 * sq6) / 360.0,
        (296.0 - 169.0 * sq6) / 1800.0,
        (-2.0 + 3.0 * sq6) / 225.0,
        (296.0 + 169.0 * sq6) / 1800.0,
        (88.0 + 7.0 * sq6) / 360.0,
        (-2.0 - 3.0 * sq6) / 225.0,
        (16.0 - sq6) / 36.0,
        (16.0 + sq6) / 36.0,
        1.0 / 9.0,
    );

    let e = error_weights(sq6);

    let a_inv = a
        .try_inverse()
        .expect("Radau IIA collocation matrix A is always invertible");

    let (gamma, alpha, beta, t, tinv) = eigendecompose(&a_inv);

    RadauCoefficients {
        a,
        c: Vector3::new(c1, c2, c3),
        e,
        gamma,
        alpha,
        beta,
        t,
        tinv,
    }
}

/// Closed-form embedded error weights (`E` in `radau5.py:917-920`).
fn error_weights(sq6: f64) -> Vector3<f64> {
    Vector3::new(
        (-13.0 - 7.0 * sq6) / 3.0,
        (-13.0 + 7.0 * sq6) / 3.0,
        -1.0 / 3.0,
    )
}

/// Eigendecomposes `A^-1` into a real eigenvalue `gamma` and a complex
/// conjugate pair `alpha +/- i*beta`, returning the real change-of-basis
/// matrix `T` (columns: real eigenvector, Re/Im of the complex eigenvector)
/// and its inverse, matching the reordering the original performs so the
/// real eigenvalue always occupies index 0.
fn eigendecompose(a_inv: &Matrix3<f64>) -> (f64, f64, f64, Matrix3<f64>, Matrix3<f64>) {
    let complex_eig = a_inv.complex_eigenvalues();

    let mut real_idx = 0;
    for i in 0..3 {
        if complex_eig[i].im.abs() < 1e-10 {
            real_idx = i;
            break;
        }
    }
    let gamma = complex_eig[real_idx].re;

    let mut complex_idx = None;
    for i in 0..3 {
        if i != real_idx && complex_eig[i].im > 0.0 {
            complex_idx = Some(i);
            break;
        }
    }
    let complex_idx = complex_idx.unwrap_or((real_idx + 1) % 3);
    let alpha = complex_eig[complex_idx].re;
    let beta = complex_eig[complex_idx].im.abs();

    // Build T by solving for eigenvectors directly: (A_inv - gamma*I) v = 0
    // for the real eigenvector, and the real/imaginary parts of the
    // eigenvector belonging to alpha + i*beta for the other two columns.
    let real_vec = null_vector(a_inv - Matrix3::identity() * gamma);

    let a_inv_c = a_inv.map(|x| Complex::new(x, 0.0));
    let shifted = a_inv_c - Matrix3::<Complex<f64>>::identity() * Complex::new(alpha, beta);
    let complex_vec = null_vector_complex(shifted);

    let t = Matrix3::from_columns(&[
        real_vec,
        Vector3::new(complex_vec.x.re, complex_vec.y.re, complex_vec.z.re),
        Vector3::new(-complex_vec.x.im, -complex_vec.y.im, -complex_vec.z.im),
    ]);
    let tinv = t.try_inverse().expect("Radau eigenvector basis is always invertible");

    (gamma, alpha, beta, t, tinv)
}

fn null_vector(m: Matrix3<f64>) -> Vector3<f64> {
    // Smallest-singular-vector proxy via QR on the transpose: for a rank-2
    // 3x3 matrix, any row of the inverse-iteration residual spans the
    // null space. We use the cross product of two (generically independent)
    // rows of `m`, which is orthogonal to both and hence spans ker(m) for a
    // rank-2 matrix.
    let r0 = m.row(0).transpose();
    let r1 = m.row(1).transpose();
    let v = r0.cross(&r1);
    if v.norm() > 1e-8 {
        v.normalize()
    } else {
        let r2 = m.row(2).transpose();
        r0.cross(&r2).normalize()
    }
}

fn null_vector_complex(m: Matrix3<Complex<f64>>) -> Vector3<Complex<f64>> {
    let r0 = m.row(0).transpose();
    let r1 = m.row(1).transpose();
    let v = cross_complex(&r0, &r1);
    if v.norm() > 1e-8 {
        v / Complex::new(v.norm(), 0.0)
    } else {
        let r2 = m.row(2).transpose();
        let v2 = cross_complex(&r0, &r2);
        v2 / Complex::new(v2.norm(), 0.0)
    }
}

fn cross_complex(a: &Vector3<Complex<f64>>, b: &Vector3<Complex<f64>>) -> Vector3<Complex<f64>> {
    Vector3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_match_known_radau_iia_constants() {
        let coeffs = coefficients();
        assert!((coeffs.c[0] - 0.1550510257216822).abs() < 1e-12);
        assert!((coeffs.c[1] - 0.6449489742783178).abs() < 1e-12);
        assert!((coeffs.c[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gamma_matches_known_real_eigenvalue() {
        let coeffs = coefficients();
        // The real eigenvalue of A^-1 for 5th-order Radau IIA is ~3.6378.
        assert!((coeffs.gamma - 3.637834252744496).abs() < 1e-9);
    }

    #[test]
    fn t_tinv_round_trip_to_identity() {
        let coeffs = coefficients();
        let prod = coeffs.t * coeffs.tinv;
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((prod[(i, j)] - expect).abs() < 1e-8);
            }
        }
    }
}
