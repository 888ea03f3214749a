//! Collocation-polynomial continuous output.
//!
//! Grounded on `_collocation_pol`/`interpolate` in the original reference
//! (`radau5.py:643-652`, `867-876`): a divided-difference construction of a
//! degree-2 polynomial per state component from the three stage increments,
//! evaluated by Horner's rule at `s = (t - t_new) / h_old`. The same
//! polynomial backs both `Radau5::interpolate` and the event-locator's
//! bisection (`event_locator.rs`), exactly as the original reuses
//! `self._col_poly` for both purposes.

use crate::newton::StageValues;
use crate::vector::RVector;

/// Divided-difference coefficients of the continuous-output polynomial,
/// indexed by state component.
pub struct CollocationPolynomial {
    /// Coefficient blocks, each length `n`: `coeffs[0]` is applied at the
    /// innermost Horner step.
    coeffs: [RVector; 3],
    c1: f64,
    c2: f64,
}

impl CollocationPolynomial {
    /// Builds the polynomial from the accepted step's stage increments.
    /// `c1`, `c2` are the first two collocation nodes (`C[0][0]`, `C[1][0]`).
    pub fn from_stage_values(z: &StageValues, c1: f64, c2: f64) -> Self {
        let n = z.z1.len();
        let mut c0 = RVector::zeros(n);
        let mut c1v = RVector::zeros(n);
        let mut c2v = RVector::zeros(n);

        for i in 0..n {
            // Mirrors the exact sequence of in-place divided differences in
            // `_collocation_pol`, just written without the aliasing.
            let p2 = z.z1[i] / c1;
            let p1 = (z.z1[i] - z.z2[i]) / (c1 - c2);
            let p0 = (z.z2[i] - z.z3[i]) / (c2 - 1.0);

            let p2 = (p1 - p2) / c2;
            let p1 = (p1 - p0) / (c1 - 1.0);
            let p2 = p1 - p2;

            c0[i] = p0;
            c1v[i] = p1;
            c2v[i] = p2;
        }

        CollocationPolynomial {
            coeffs: [c0, c1v, c2v],
            c1,
            c2,
        }
    }

    /// Evaluates the continuous output at fractional step position `s`
    /// (dimensionless, `s = (t - t_new) / h_old`) relative to state `y_c`.
    pub fn evaluate(&self, y_c: &RVector, s: f64) -> RVector {
        let n = y_c.len();
        let mut out = RVector::zeros(n);
        for i in 0..n {
            let z = &self.coeffs[0][i]
                + (s - self.c2 + 1.0) * (&self.coeffs[1][i] + (s - self.c1 + 1.0) * &self.coeffs[2][i]);
            out[i] = y_c[i] + s * z;
        }
        out
    }

    /// Extrapolates starting stage increments for the *next* step from this
    /// step's polynomial, per spec.md §4.4's Newton starting-values rule:
    /// `cq_i = c_i * h_new / h_old`, the new step's stage nodes expressed as
    /// a fractional position of the just-finished step, evaluated past the
    /// polynomial's own `[0, 1]` domain. `y_c` is the anchor this polynomial
    /// was built against (the just-finished step's end state).
    pub fn extrapolate(&self, y_c: &RVector, c: &nalgebra::Vector3<f64>, h_new: f64, h_old: f64) -> StageValues {
        let ratio = h_new / h_old;
        StageValues {
            z1: self.evaluate(y_c, c[0] * ratio) - y_c,
            z2: self.evaluate(y_c, c[1] * ratio) - y_c,
            z3: self.evaluate(y_c, c[2] * ratio) - y_c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluating_at_s_zero_returns_yc() {
        let z = StageValues {
            z1: RVector::from_vec(vec![1.0, 2.0]),
            z2: RVector::from_vec(vec![1.5, 2.5]),
            z3: RVector::from_vec(vec![2.0, 3.0]),
        };
        let poly = CollocationPolynomial::from_stage_values(&z, 0.1550510257216822, 0.6449489742783178);
        let y_c = RVector::from_vec(vec![10.0, 20.0]);
        let out = poly.evaluate(&y_c, 0.0);
        assert!((out[0] - 10.0).abs() < 1e-12);
        assert!((out[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn evaluating_at_s_one_returns_yc_plus_z3() {
        let z = StageValues {
            z1: RVector::from_vec(vec![1.0, 2.0]),
            z2: RVector::from_vec(vec![1.5, 2.5]),
            z3: RVector::from_vec(vec![2.0, 3.0]),
        };
        let poly = CollocationPolynomial::from_stage_values(&z, 0.1550510257216822, 0.6449489742783178);
        let y_c = RVector::from_vec(vec![10.0, 20.0]);
        let out = poly.evaluate(&y_c, 1.0);
        assert!((out[0] - 12.0).abs() < 1e-9);
        assert!((out[1] - 23.0).abs() < 1e-9);
    }
}
