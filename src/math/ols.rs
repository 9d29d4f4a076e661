//! Weighted least squares solver.
//!
//! Linear fits here solve problems of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and solve an ordinary least squares problem.
//! - We use SVD so that tall (more rows than columns) and rank-deficient
//!   systems both get a solution; small singular values are zeroed, which
//!   yields the minimum-norm solution for underdetermined polynomial fits.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve `minimize Σ w_i (y_i - x_i^T β)^2` by row scaling.
///
/// # Panics
/// Panics if `w` does not have one entry per row of `x`.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    w: &[f64],
) -> Option<DVector<f64>> {
    assert_eq!(w.len(), x.nrows(), "one weight per observation");

    let mut xw = x.clone();
    let mut yw = y.clone();
    for (i, &wi) in w.iter().enumerate() {
        let sw = wi.max(0.0).sqrt();
        xw.row_mut(i).scale_mut(sw);
        yw[i] *= sw;
    }

    solve_least_squares(&xw, &yw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn weights_pull_the_fit_toward_heavy_rows() {
        // Constant model on y = [0, 10]; the mean moves with the weights.
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[0.0, 10.0]);

        let even = solve_weighted_least_squares(&x, &y, &[1.0, 1.0]).unwrap();
        assert!((even[0] - 5.0).abs() < 1e-10);

        let skewed = solve_weighted_least_squares(&x, &y, &[1.0, 3.0]).unwrap();
        assert!((skewed[0] - 7.5).abs() < 1e-10);
    }

    #[test]
    fn underdetermined_system_returns_minimum_norm_solution() {
        // One equation, two unknowns: b0 + b1 = 2 -> minimum norm is (1, 1).
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[2.0]);
        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] - 1.0).abs() < 1e-10);
    }
}
