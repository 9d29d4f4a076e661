//! Model evaluation for the polynomial / gaussian / harmonic families.
//!
//! Coefficient order per family:
//!
//! - polynomial: `[c0, c1, ..., cd]`, ascending powers of `x`
//! - gaussian: `[a, b, c]` for `a * exp(-(x - b)^2 / (2 c^2))`
//! - harmonic: `[a, ω, φ]` for `a * cos(ω x + φ)`

use std::fmt;

use crate::domain::ModelFamily;
use crate::error::FitError;
use crate::math::{ChebyshevSeries, ParametricCurve, horner, trim_trailing_zeros};

/// Predict `y(x)` for the given family and coefficients.
///
/// # Panics
/// Panics if a nonlinear family receives fewer than three coefficients.
pub fn predict(family: ModelFamily, x: f64, coefficients: &[f64]) -> f64 {
    match family {
        ModelFamily::Polynomial => horner(coefficients, x),
        ModelFamily::Gaussian => GaussianCurve.value(x, coefficients),
        ModelFamily::Harmonic => HarmonicCurve.value(x, coefficients),
    }
}

/// `a * exp(-(x - b)^2 / (2 c^2))`
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianCurve;

impl ParametricCurve for GaussianCurve {
    fn param_count(&self) -> usize {
        3
    }

    fn value(&self, x: f64, p: &[f64]) -> f64 {
        let (a, b, c) = (p[0], p[1], p[2]);
        let d = x - b;
        a * (-d * d / (2.0 * c * c)).exp()
    }

    fn gradient(&self, x: f64, p: &[f64], out: &mut [f64]) {
        let (a, b, c) = (p[0], p[1], p[2]);
        let d = x - b;
        let c2 = c * c;
        let e = (-d * d / (2.0 * c2)).exp();
        out[0] = e;
        out[1] = a * e * d / c2;
        out[2] = a * e * d * d / (c2 * c);
    }
}

/// `a * cos(ω x + φ)`
#[derive(Debug, Clone, Copy, Default)]
pub struct HarmonicCurve;

impl ParametricCurve for HarmonicCurve {
    fn param_count(&self) -> usize {
        3
    }

    fn value(&self, x: f64, p: &[f64]) -> f64 {
        p[0] * (p[1] * x + p[2]).cos()
    }

    fn gradient(&self, x: f64, p: &[f64], out: &mut [f64]) {
        let (a, omega, phi) = (p[0], p[1], p[2]);
        let (sin, cos) = (omega * x + phi).sin_cos();
        out[0] = cos;
        out[1] = -a * x * sin;
        out[2] = -a * sin;
    }
}

/// Immutable function produced by a successful fit.
///
/// Fitted polynomials evaluate through their Chebyshev form; the monomial
/// coefficients are kept for `coefficients()` and the display string.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedFunction {
    family: ModelFamily,
    coefficients: Vec<f64>,
    series: Option<ChebyshevSeries>,
}

impl FittedFunction {
    /// Wrap coefficients in the family's canonical order (see module docs).
    ///
    /// Polynomial coefficients lose exactly-zero high-order terms so that
    /// `degree()` is the highest non-zero power. Gaussian and harmonic
    /// functions take exactly three parameters.
    pub fn new(family: ModelFamily, coefficients: Vec<f64>) -> Result<Self, FitError> {
        let coefficients = match family.fixed_param_count() {
            Some(count) if coefficients.len() != count => {
                return Err(FitError::ParameterCount {
                    family,
                    expected: "3",
                    got: coefficients.len(),
                });
            }
            Some(_) => coefficients,
            None if coefficients.is_empty() => {
                return Err(FitError::ParameterCount {
                    family,
                    expected: "at least 1",
                    got: 0,
                });
            }
            None => trim_trailing_zeros(&coefficients).to_vec(),
        };
        Ok(Self {
            family,
            coefficients,
            series: None,
        })
    }

    /// Polynomial from a fitted Chebyshev series.
    pub fn from_series(series: ChebyshevSeries) -> Result<Self, FitError> {
        let family = ModelFamily::Polynomial;
        let monomials = series.to_monomials();
        if series.coefficients().is_empty() || monomials.iter().any(|c| !c.is_finite()) {
            return Err(FitError::NonFinite { family });
        }
        Ok(Self {
            family,
            coefficients: trim_trailing_zeros(&monomials).to_vec(),
            series: Some(series),
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Coefficients in the family's canonical order; raw-`x` monomials for
    /// polynomials.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluate at `x`. Extrapolation outside the sampled range is not guarded.
    pub fn value(&self, x: f64) -> f64 {
        match &self.series {
            Some(series) => series.value(x),
            None => predict(self.family, x, &self.coefficients),
        }
    }

    /// Reported degree.
    ///
    /// Polynomial: highest non-zero power. Gaussian/harmonic: the parameter
    /// count (3), which is not a polynomial degree.
    pub fn degree(&self) -> usize {
        match self.family.fixed_param_count() {
            Some(count) => count,
            None => self.coefficients.len().saturating_sub(1),
        }
    }

    /// Human readable, Wolfram Alpha compatible formula.
    pub fn to_display_string(&self) -> String {
        match (self.family, self.coefficients.as_slice()) {
            (ModelFamily::Gaussian, &[a, b, c]) => {
                format!("{a:?} * exp(-(x {}) ^ 2 / (2 * {c:?} ^ 2))", signed(-b))
            }
            (ModelFamily::Harmonic, &[a, omega, phi]) => {
                format!("{a:?} * cos({omega:?} * x {})", signed(phi))
            }
            (_, coefficients) => format_polynomial(coefficients),
        }
    }
}

impl fmt::Display for FittedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Highest power first: `1.0 x^2 - 2.0 x + 3.0`. Zero terms are skipped.
fn format_polynomial(coefficients: &[f64]) -> String {
    let mut out = String::new();
    for (power, &c) in coefficients.iter().enumerate().rev() {
        if c == 0.0 {
            continue;
        }
        let magnitude = if out.is_empty() {
            format!("{c:?}")
        } else {
            out.push_str(if c < 0.0 { " - " } else { " + " });
            format!("{:?}", c.abs())
        };
        out.push_str(&magnitude);
        match power {
            0 => {}
            1 => out.push_str(" x"),
            p => out.push_str(&format!(" x^{p}")),
        }
    }
    if out.is_empty() {
        out.push_str("0.0");
    }
    out
}

fn signed(v: f64) -> String {
    if v < 0.0 {
        format!("- {:?}", -v)
    } else {
        format!("+ {v:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::AffineScale;
    use proptest::prelude::*;

    /// Evaluate the polynomial display format: `c x^k (+|-) c x^k ... (+|-) c`.
    fn eval_display(expr: &str, x: f64) -> f64 {
        let tokens: Vec<&str> = expr.split(' ').collect();
        let mut total = 0.0;
        let mut sign = 1.0;
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i] {
                "+" => sign = 1.0,
                "-" => sign = -1.0,
                tok => {
                    let coef: f64 = tok.parse().unwrap();
                    let power = match tokens.get(i + 1) {
                        Some(&"x") => {
                            i += 1;
                            1
                        }
                        Some(t) if t.starts_with("x^") => {
                            i += 1;
                            t[2..].parse().unwrap()
                        }
                        _ => 0,
                    };
                    total += sign * coef * x.powi(power);
                }
            }
            i += 1;
        }
        total
    }

    #[test]
    fn polynomial_display_is_highest_power_first() {
        let f = FittedFunction::new(ModelFamily::Polynomial, vec![3.0, 2.0, 1.0]).unwrap();
        assert_eq!(f.to_display_string(), "1.0 x^2 + 2.0 x + 3.0");
        assert_eq!(f.degree(), 2);
    }

    #[test]
    fn polynomial_display_handles_signs_and_zero_terms() {
        let f = FittedFunction::new(ModelFamily::Polynomial, vec![-3.0, 0.0, -0.5, 2.0]).unwrap();
        assert_eq!(f.to_display_string(), "2.0 x^3 - 0.5 x^2 - 3.0");

        let zero = FittedFunction::new(ModelFamily::Polynomial, vec![0.0, 0.0]).unwrap();
        assert_eq!(zero.to_display_string(), "0.0");
        assert_eq!(zero.degree(), 0);
        assert_eq!(zero.value(12.0), 0.0);
    }

    #[test]
    fn trailing_zero_coefficients_do_not_count_toward_degree() {
        let f = FittedFunction::new(ModelFamily::Polynomial, vec![1.0, 2.0, 0.0, 0.0]).unwrap();
        assert_eq!(f.degree(), 1);
        assert_eq!(f.coefficients(), &[1.0, 2.0]);
    }

    #[test]
    fn nonlinear_families_report_parameter_count_as_degree() {
        let g = FittedFunction::new(ModelFamily::Gaussian, vec![2.0, 1.0, 0.5]).unwrap();
        assert_eq!(g.degree(), 3);
        assert!((g.value(1.0) - 2.0).abs() < 1e-12);
        assert_eq!(g.to_display_string(), "2.0 * exp(-(x - 1.0) ^ 2 / (2 * 0.5 ^ 2))");

        let h = FittedFunction::new(ModelFamily::Harmonic, vec![3.0, 2.0, -0.25]).unwrap();
        assert_eq!(h.degree(), 3);
        assert!((h.value(0.125) - 3.0).abs() < 1e-12);
        assert_eq!(h.to_display_string(), "3.0 * cos(2.0 * x - 0.25)");
    }

    #[test]
    fn wrong_parameter_counts_are_rejected() {
        let err = FittedFunction::new(ModelFamily::Gaussian, vec![]).unwrap_err();
        assert_eq!(
            err,
            FitError::ParameterCount {
                family: ModelFamily::Gaussian,
                expected: "3",
                got: 0
            }
        );
        assert!(FittedFunction::new(ModelFamily::Harmonic, vec![1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(FittedFunction::new(ModelFamily::Polynomial, vec![]).is_err());
    }

    #[test]
    fn series_backed_function_prints_raw_monomials() {
        let series = ChebyshevSeries::new(AffineScale::from_range(10.0, 30.0), vec![2.0, 3.0]);
        let f = FittedFunction::from_series(series).unwrap();
        // 2 + 3 (x - 20) / 10
        assert_eq!(f.degree(), 1);
        assert!((f.coefficients()[0] + 4.0).abs() < 1e-12);
        assert!((f.coefficients()[1] - 0.3).abs() < 1e-12);
        assert!((f.value(25.0) - 3.5).abs() < 1e-12);
        assert!((eval_display(&f.to_display_string(), 25.0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn gaussian_gradient_matches_finite_differences() {
        let p = [2.0, 1.5, 0.8];
        let mut g = [0.0; 3];
        for &x in &[0.0, 1.0, 2.7] {
            GaussianCurve.gradient(x, &p, &mut g);
            for j in 0..3 {
                let h = 1e-6;
                let mut hi = p;
                let mut lo = p;
                hi[j] += h;
                lo[j] -= h;
                let fd = (GaussianCurve.value(x, &hi) - GaussianCurve.value(x, &lo)) / (2.0 * h);
                assert!((fd - g[j]).abs() < 1e-6, "x={x} j={j}: {fd} vs {}", g[j]);
            }
        }
    }

    #[test]
    fn harmonic_gradient_matches_finite_differences() {
        let p = [1.2, 0.9, 0.3];
        let mut g = [0.0; 3];
        for &x in &[-1.0, 0.5, 4.0] {
            HarmonicCurve.gradient(x, &p, &mut g);
            for j in 0..3 {
                let h = 1e-6;
                let mut hi = p;
                let mut lo = p;
                hi[j] += h;
                lo[j] -= h;
                let fd = (HarmonicCurve.value(x, &hi) - HarmonicCurve.value(x, &lo)) / (2.0 * h);
                assert!((fd - g[j]).abs() < 1e-6, "x={x} j={j}: {fd} vs {}", g[j]);
            }
        }
    }

    proptest! {
        #[test]
        fn polynomial_display_round_trips(
            coefs in prop::collection::vec(-1e3f64..1e3, 1..6),
            x in -5.0f64..5.0,
        ) {
            let magnitude: f64 = coefs.iter().enumerate().map(|(k, c)| c.abs() * x.abs().powi(k as i32)).sum();
            let f = FittedFunction::new(ModelFamily::Polynomial, coefs).unwrap();
            let direct = f.value(x);
            let parsed = eval_display(&f.to_display_string(), x);
            prop_assert!((direct - parsed).abs() <= 1e-12 * magnitude, "{direct} vs {parsed}");
        }
    }
}
