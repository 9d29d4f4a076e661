//! Coefficient solving for a single model family.
//!
//! Given a `SampleSet`, a family and a degree we:
//! - build the observation list (uniform weights)
//! - solve the family's least-squares problem
//! - return a `FittedFunction` (coefficients in the family's canonical order,
//!   see `models`)
//!
//! Polynomial fits are linear and solved directly by SVD on a Chebyshev
//! design matrix over the scaled sizes. Gaussian and harmonic fits are nonlinear and go through
//! Levenberg–Marquardt from a data-driven starting point.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::data::SampleSet;
use crate::domain::ModelFamily;
use crate::error::FitError;
use crate::fit::guess::{guess_gaussian, guess_harmonic};
use crate::math::{
    AffineScale, ChebyshevSeries, LmOptions, ParametricCurve, chebyshev_row, levenberg_marquardt,
    solve_weighted_least_squares,
};
use crate::models::{FittedFunction, GaussianCurve, HarmonicCurve};

/// One weighted observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

/// Fitting options that do not come from the family/degree choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// Iteration budget of the nonlinear solver.
    pub max_iterations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { max_iterations: 1000 }
    }
}

/// Observations for a sample set; every sample carries weight 1.
pub fn observations(samples: &SampleSet) -> Vec<Observation> {
    samples
        .samples()
        .iter()
        .map(|s| Observation {
            x: s.x,
            y: s.y,
            weight: 1.0,
        })
        .collect()
}

/// Fit `family` to the samples.
///
/// For the polynomial family the fitted degree is `min(degree, n - 1)`: with
/// `n` distinct sizes a higher degree has no unique least-squares solution.
pub fn fit(
    samples: &SampleSet,
    family: ModelFamily,
    degree: usize,
    opts: &FitOptions,
) -> Result<FittedFunction, FitError> {
    let obs = observations(samples);
    match family {
        ModelFamily::Polynomial => FittedFunction::from_series(fit_polynomial(&obs, degree)?),
        ModelFamily::Gaussian => {
            let initial = guess_gaussian(samples.samples());
            let mut params = fit_nonlinear(&GaussianCurve, family, &obs, &initial, opts)?;
            params[2] = params[2].abs();
            if params[2] == 0.0 {
                return Err(FitError::NonFinite { family });
            }
            FittedFunction::new(family, params)
        }
        ModelFamily::Harmonic => {
            let initial = guess_harmonic(samples.samples());
            let params = fit_nonlinear(&HarmonicCurve, family, &obs, &initial, opts)?;
            FittedFunction::new(family, normalize_harmonic(params))
        }
    }
}

/// Coefficients of `fit` in the family's canonical order.
pub fn solve(
    samples: &SampleSet,
    family: ModelFamily,
    degree: usize,
    opts: &FitOptions,
) -> Result<Vec<f64>, FitError> {
    fit(samples, family, degree, opts).map(|f| f.coefficients().to_vec())
}

fn fit_polynomial(obs: &[Observation], degree: usize) -> Result<ChebyshevSeries, FitError> {
    let n = obs.len();
    if n == 0 {
        return Err(FitError::InsufficientObservations {
            family: ModelFamily::Polynomial,
            needed: 1,
            got: 0,
        });
    }

    let degree = degree.min(n - 1);
    let k = degree + 1;

    // Work on t in [-1, 1] with a Chebyshev basis; raw sizes (e.g. 10..300)
    // make monomial Vandermonde columns span many orders of magnitude.
    let (x_min, x_max) = obs.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), o| {
        (lo.min(o.x), hi.max(o.x))
    });
    let map = AffineScale::from_range(x_min, x_max);

    let mut design = DMatrix::<f64>::zeros(n, k);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; k];
    for (i, o) in obs.iter().enumerate() {
        chebyshev_row(map.apply(o.x), &mut row);
        for (j, &v) in row.iter().enumerate() {
            design[(i, j)] = v;
        }
        y[i] = o.y;
    }
    let weights: Vec<f64> = obs.iter().map(|o| o.weight).collect();

    let scaled = solve_weighted_least_squares(&design, &y, &weights).ok_or(FitError::Singular { n, k })?;
    if scaled.iter().any(|c| !c.is_finite()) {
        return Err(FitError::NonFinite {
            family: ModelFamily::Polynomial,
        });
    }

    debug!(degree, n, "polynomial fit solved");
    Ok(ChebyshevSeries::new(map, scaled.as_slice().to_vec()))
}

fn fit_nonlinear<C: ParametricCurve>(
    curve: &C,
    family: ModelFamily,
    obs: &[Observation],
    initial: &[f64],
    opts: &FitOptions,
) -> Result<Vec<f64>, FitError> {
    let needed = curve.param_count();
    if obs.len() < needed {
        return Err(FitError::InsufficientObservations {
            family,
            needed,
            got: obs.len(),
        });
    }

    let xs: Vec<f64> = obs.iter().map(|o| o.x).collect();
    let ys: Vec<f64> = obs.iter().map(|o| o.y).collect();
    let ws: Vec<f64> = obs.iter().map(|o| o.weight).collect();

    let lm = LmOptions {
        max_iterations: opts.max_iterations,
        ..LmOptions::default()
    };
    let outcome = levenberg_marquardt(curve, &xs, &ys, &ws, initial, &lm);

    debug!(
        %family,
        iterations = outcome.iterations,
        cost = outcome.cost,
        converged = outcome.converged,
        "nonlinear fit finished"
    );

    if !outcome.converged {
        return Err(FitError::NotConverged {
            family,
            iterations: opts.max_iterations,
        });
    }
    if outcome.params.iter().any(|p| !p.is_finite()) {
        return Err(FitError::NonFinite { family });
    }
    Ok(outcome.params)
}

/// Canonical harmonic parameters: `a >= 0`, `ω >= 0`, `φ ∈ (-π, π]`.
fn normalize_harmonic(mut p: Vec<f64>) -> Vec<f64> {
    if p[0] < 0.0 {
        p[0] = -p[0];
        p[2] += PI;
    }
    if p[1] < 0.0 {
        p[1] = -p[1];
        p[2] = -p[2];
    }
    let wrapped = (p[2] + PI).rem_euclid(2.0 * PI) - PI;
    p[2] = if wrapped <= -PI { PI } else { wrapped };
    p
}
