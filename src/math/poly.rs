//! Polynomial helpers.
//!
//! Coefficients are stored in ascending order: `c[k]` multiplies `x^k`
//! (monomials) or `T_k(t)` (Chebyshev series).

/// Evaluate `Σ c_k x^k` with Horner's scheme.
pub fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Affine map `t = (x - center) / scale` onto roughly `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineScale {
    pub center: f64,
    pub scale: f64,
}

impl AffineScale {
    /// Map `[min, max]` onto `[-1, 1]`. Degenerate ranges keep unit scale.
    pub fn from_range(min: f64, max: f64) -> Self {
        let center = 0.5 * (min + max);
        let half = 0.5 * (max - min);
        let scale = if half.is_finite() && half > 0.0 { half } else { 1.0 };
        Self { center, scale }
    }

    pub fn apply(&self, x: f64) -> f64 {
        (x - self.center) / self.scale
    }

    /// Rewrite `Σ b_k t^k` as monomial coefficients in `x`.
    pub fn expand(&self, scaled: &[f64]) -> Vec<f64> {
        // Horner over polynomials: acc = acc * t + b_k, with t = (x - m) / s.
        let mut acc: Vec<f64> = Vec::with_capacity(scaled.len());
        for &b in scaled.iter().rev() {
            let mut next = vec![0.0; acc.len() + 1];
            for (j, &a) in acc.iter().enumerate() {
                next[j + 1] += a / self.scale;
                next[j] -= a * self.center / self.scale;
            }
            next[0] += b;
            acc = next;
        }
        acc
    }
}

/// Fill `row[k]` with the Chebyshev polynomial `T_k(t)`.
pub fn chebyshev_row(t: f64, row: &mut [f64]) {
    for k in 0..row.len() {
        row[k] = match k {
            0 => 1.0,
            1 => t,
            _ => 2.0 * t * row[k - 1] - row[k - 2],
        };
    }
}

/// Chebyshev series `Σ c_k T_k(t)` over `t = map(x)`.
///
/// Fitted polynomials are kept and evaluated in this form. Raw-`x` monomials
/// cancel badly at high degree or for sizes far from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevSeries {
    map: AffineScale,
    coefficients: Vec<f64>,
}

impl ChebyshevSeries {
    /// Exactly-zero high-order coefficients are dropped.
    pub fn new(map: AffineScale, coefficients: Vec<f64>) -> Self {
        let coefficients = trim_trailing_zeros(&coefficients).to_vec();
        Self { map, coefficients }
    }

    pub fn map(&self) -> AffineScale {
        self.map
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Clenshaw recurrence in `t`.
    pub fn value(&self, x: f64) -> f64 {
        let t = self.map.apply(x);
        let (mut b1, mut b2) = (0.0, 0.0);
        for &c in self.coefficients.iter().skip(1).rev() {
            let b0 = c + 2.0 * t * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        match self.coefficients.first() {
            Some(&c0) => c0 + t * b1 - b2,
            None => 0.0,
        }
    }

    /// Monomial coefficients in `x`, for printing and export only.
    pub fn to_monomials(&self) -> Vec<f64> {
        let n = self.coefficients.len();
        let mut power = vec![0.0; n];
        // T_{k-1} and T_k as power series in t.
        let mut t_prev: Vec<f64> = Vec::new();
        let mut t_k = vec![0.0; n];
        if let Some(first) = t_k.first_mut() {
            *first = 1.0;
        }
        for (k, &c) in self.coefficients.iter().enumerate() {
            for (p, &tk) in power.iter_mut().zip(&t_k) {
                *p += c * tk;
            }
            let factor = if k == 0 { 1.0 } else { 2.0 };
            let mut next = vec![0.0; n];
            for j in 0..n.saturating_sub(1) {
                next[j + 1] = factor * t_k[j];
            }
            for (nj, &pj) in next.iter_mut().zip(&t_prev) {
                *nj -= pj;
            }
            t_prev = std::mem::replace(&mut t_k, next);
        }
        self.map.expand(&power)
    }
}

/// Drop exactly-zero high-order coefficients, keeping at least one entry.
pub fn trim_trailing_zeros(coefficients: &[f64]) -> &[f64] {
    let len = coefficients
        .iter()
        .rposition(|&c| c != 0.0)
        .map_or(1, |i| i + 1)
        .min(coefficients.len());
    &coefficients[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horner_matches_naive_sum() {
        let c = [3.0, 2.0, 1.0];
        assert_eq!(horner(&c, 2.0), 3.0 + 4.0 + 4.0);
        assert_eq!(horner(&[], 5.0), 0.0);
    }

    #[test]
    fn expand_reproduces_scaled_polynomial() {
        let map = AffineScale::from_range(10.0, 30.0);
        let scaled = [1.5, -2.0, 0.25, 4.0];
        let mono = map.expand(&scaled);
        assert_eq!(mono.len(), scaled.len());
        for &x in &[10.0, 13.0, 20.0, 27.5, 30.0, 45.0] {
            let want = horner(&scaled, map.apply(x));
            let got = horner(&mono, x);
            assert!((want - got).abs() < 1e-9 * want.abs().max(1.0), "x={x}: {want} vs {got}");
        }
    }

    #[test]
    fn degenerate_range_uses_unit_scale() {
        let map = AffineScale::from_range(5.0, 5.0);
        assert_eq!(map.scale, 1.0);
        assert_eq!(map.apply(6.0), 1.0);
    }

    #[test]
    fn chebyshev_rows_follow_the_recurrence() {
        let mut row = [0.0; 5];
        chebyshev_row(0.5, &mut row);
        // T_2 = 2t^2 - 1, T_3 = 4t^3 - 3t, T_4 = 8t^4 - 8t^2 + 1
        assert_eq!(row, [1.0, 0.5, -0.5, -1.0, -0.5]);
    }

    #[test]
    fn clenshaw_matches_explicit_sum() {
        let series = ChebyshevSeries::new(AffineScale::from_range(-1.0, 1.0), vec![0.5, -1.0, 2.0, 0.75]);
        for &t in &[-1.0, -0.3, 0.0, 0.6, 1.0] {
            let mut row = [0.0; 4];
            chebyshev_row(t, &mut row);
            let want: f64 = row.iter().zip(series.coefficients()).map(|(r, c)| r * c).sum();
            assert!((series.value(t) - want).abs() < 1e-12, "t={t}");
        }
        assert_eq!(ChebyshevSeries::new(AffineScale::from_range(0.0, 1.0), vec![]).value(3.0), 0.0);
    }

    #[test]
    fn series_converts_to_raw_monomials() {
        let series = ChebyshevSeries::new(AffineScale::from_range(10.0, 30.0), vec![1.0, 2.0, -0.5, 0.25, 0.0]);
        let mono = series.to_monomials();
        assert_eq!(mono.len(), 4);
        for &x in &[10.0, 12.5, 20.0, 29.0, 30.0] {
            let want = series.value(x);
            let got = horner(&mono, x);
            assert!((want - got).abs() < 1e-9 * want.abs().max(1.0), "x={x}: {want} vs {got}");
        }
    }

    #[test]
    fn trims_only_trailing_exact_zeros() {
        assert_eq!(trim_trailing_zeros(&[1.0, 0.0, 2.0, 0.0, 0.0]), &[1.0, 0.0, 2.0]);
        assert_eq!(trim_trailing_zeros(&[0.0, 0.0]), &[0.0]);
        assert_eq!(trim_trailing_zeros(&[1e-300]), &[1e-300]);
        assert!(trim_trailing_zeros(&[]).is_empty());
    }
}
