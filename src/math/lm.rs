//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes
//!
//! ```text
//! Σ w_i (y_i - f(x_i; p))^2
//! ```
//!
//! over the parameter vector `p` for a curve with an analytic gradient.
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ diag(JᵀJ)) δ = Jᵀr
//! ```
//!
//! with a Cholesky factorization. Accepted steps shrink `λ`, rejected steps
//! grow it. The problems here have three parameters, so dense `nalgebra`
//! matrices are more than enough.

use nalgebra::{DMatrix, DVector};

/// A curve `f(x; p)` with parameter gradient.
pub trait ParametricCurve {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    fn value(&self, x: f64, params: &[f64]) -> f64;

    /// Write `∂f/∂p_j` at `x` into `out` (length `param_count()`).
    fn gradient(&self, x: f64, params: &[f64], out: &mut [f64]);
}

/// Solver tolerances and budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmOptions {
    pub max_iterations: usize,
    /// Relative cost reduction below which an accepted step counts as converged.
    pub ftol: f64,
    /// Relative step size below which an accepted step counts as converged.
    pub xtol: f64,
    /// Gradient infinity norm below which the current point is stationary.
    pub gtol: f64,
    pub initial_lambda: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-14,
            initial_lambda: 1e-3,
        }
    }
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LmOutcome {
    pub params: Vec<f64>,
    /// Weighted sum of squared residuals at `params`.
    pub cost: f64,
    pub iterations: usize,
    pub converged: bool,
}

const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;

/// Run Levenberg–Marquardt from `initial`.
///
/// # Panics
/// Panics if `xs`, `ys` and `weights` differ in length or `initial` does not
/// have `curve.param_count()` entries.
pub fn levenberg_marquardt<C: ParametricCurve>(
    curve: &C,
    xs: &[f64],
    ys: &[f64],
    weights: &[f64],
    initial: &[f64],
    opts: &LmOptions,
) -> LmOutcome {
    assert_eq!(xs.len(), ys.len());
    assert_eq!(xs.len(), weights.len());
    assert_eq!(initial.len(), curve.param_count());

    let n = xs.len();
    let m = curve.param_count();

    let mut params = DVector::from_column_slice(initial);
    let mut cost = weighted_cost(curve, xs, ys, weights, params.as_slice());
    let mut lambda = opts.initial_lambda;

    if !cost.is_finite() {
        return LmOutcome {
            params: params.as_slice().to_vec(),
            cost,
            iterations: 0,
            converged: false,
        };
    }

    let mut jac = DMatrix::<f64>::zeros(n, m);
    let mut res = DVector::<f64>::zeros(n);
    let mut grad_row = vec![0.0; m];

    for iteration in 1..=opts.max_iterations {
        if cost <= f64::MIN_POSITIVE {
            return outcome(params, cost, iteration - 1, true);
        }

        for i in 0..n {
            let sw = weights[i].max(0.0).sqrt();
            curve.gradient(xs[i], params.as_slice(), &mut grad_row);
            for j in 0..m {
                jac[(i, j)] = sw * grad_row[j];
            }
            res[i] = sw * (ys[i] - curve.value(xs[i], params.as_slice()));
        }

        let jtj = jac.transpose() * &jac;
        let g = jac.transpose() * &res;

        if g.amax() <= opts.gtol {
            return outcome(params, cost, iteration, true);
        }

        // Inner loop: raise damping until a step lowers the cost.
        loop {
            let mut damped = jtj.clone();
            for j in 0..m {
                damped[(j, j)] += lambda * jtj[(j, j)].max(1e-12);
            }

            let step = damped.cholesky().map(|c| c.solve(&g));
            let Some(delta) = step.filter(|d| d.iter().all(|v| v.is_finite())) else {
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    return outcome(params, cost, iteration, true);
                }
                continue;
            };

            let candidate = &params + &delta;
            let new_cost = weighted_cost(curve, xs, ys, weights, candidate.as_slice());

            if new_cost.is_finite() && new_cost < cost {
                let reduction = cost - new_cost;
                let small_step = delta.norm() <= opts.xtol * (params.norm() + opts.xtol);
                params = candidate;
                cost = new_cost;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if reduction <= opts.ftol * cost || small_step {
                    return outcome(params, cost, iteration, true);
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No representable step reduces the cost any further.
                return outcome(params, cost, iteration, true);
            }
        }
    }

    outcome(params, cost, opts.max_iterations, false)
}

/// Weighted sum of squared residuals.
pub fn weighted_cost<C: ParametricCurve>(curve: &C, xs: &[f64], ys: &[f64], weights: &[f64], params: &[f64]) -> f64 {
    xs.iter()
        .zip(ys)
        .zip(weights)
        .map(|((&x, &y), &w)| {
            let r = y - curve.value(x, params);
            w * r * r
        })
        .sum()
}

fn outcome(params: DVector<f64>, cost: f64, iterations: usize, converged: bool) -> LmOutcome {
    LmOutcome {
        params: params.as_slice().to_vec(),
        cost,
        iterations,
        converged,
    }
}
