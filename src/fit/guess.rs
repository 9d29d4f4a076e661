//! Starting parameters for the nonlinear families.
//!
//! Levenberg–Marquardt only finds the minimum nearest to where it starts, so
//! the guesses below are read off the data shape:
//!
//! - gaussian: peak height and location, width from the full width at half
//!   maximum (falling back to the sampled x-range)
//! - harmonic: amplitude and pulsation from integrals of `y²` and `y'²`
//!   over the samples, then the phase from a projection on `cos`/`sin`
//!
//! All functions expect samples sorted by ascending, unique x (as `SampleSet`
//! guarantees).

use std::f64::consts::PI;

use crate::domain::Sample;

/// `[a, b, c]` starting point for `a * exp(-(x - b)^2 / (2 c^2))`.
pub fn guess_gaussian(samples: &[Sample]) -> [f64; 3] {
    let Some((peak, top)) = samples
        .iter()
        .enumerate()
        .max_by(|(_, p), (_, q)| p.y.abs().total_cmp(&q.y.abs()))
    else {
        return [0.0, 0.0, 1.0];
    };

    let half = top.y / 2.0;
    let left = half_height_crossing(samples, peak, half, Direction::Left);
    let right = half_height_crossing(samples, peak, half, Direction::Right);

    let (x_min, x_max) = x_range(samples);
    let fwhm = match (left, right) {
        (Some(l), Some(r)) => r - l,
        // One-sided peak: mirror the half width we did see.
        (Some(l), None) => 2.0 * (top.x - l),
        (None, Some(r)) => 2.0 * (r - top.x),
        (None, None) => x_max - x_min,
    };

    let mut sigma = fwhm / (2.0 * (2.0 * 2f64.ln()).sqrt());
    if !(sigma.is_finite() && sigma > 0.0) {
        sigma = if x_max > x_min { 0.5 * (x_max - x_min) } else { 1.0 };
    }

    [top.y, top.x, sigma]
}

/// `[a, ω, φ]` starting point for `a * cos(ω x + φ)`.
pub fn guess_harmonic(samples: &[Sample]) -> [f64; 3] {
    let (amplitude, omega) = guess_amplitude_pulsation(samples);
    let phase = guess_phase(samples, omega);
    [amplitude, omega, phase]
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Left,
    Right,
}

/// x where the curve first drops to `half` walking away from `peak`.
fn half_height_crossing(samples: &[Sample], peak: usize, half: f64, dir: Direction) -> Option<f64> {
    let steps: Box<dyn Iterator<Item = usize>> = match dir {
        Direction::Left => Box::new((1..=peak).rev()),
        Direction::Right => Box::new(peak + 1..samples.len()),
    };

    let mut prev = samples[peak];
    for i in steps {
        let next = match dir {
            Direction::Left => samples[i - 1],
            Direction::Right => samples[i],
        };
        if next.y.abs() <= half.abs() {
            let dy = next.y - prev.y;
            if dy == 0.0 {
                return Some(next.x);
            }
            return Some(prev.x + (half - prev.y) * (next.x - prev.x) / dy);
        }
        prev = next;
    }
    None
}

fn guess_amplitude_pulsation(samples: &[Sample]) -> (f64, f64) {
    let (x_min, x_max) = x_range(samples);
    let fallback = || {
        let (y_min, y_max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s.y), hi.max(s.y)));
        let span = x_max - x_min;
        let omega = if span > 0.0 { 2.0 * PI / span } else { 1.0 };
        (0.5 * (y_max - y_min), omega)
    };

    let Some(first) = samples.first() else {
        return (0.0, 1.0);
    };

    // For y = a cos(ωx + φ):  ∫y'² = ω² ∫(a² - y²), which is linear in the
    // running integrals; fit it by least squares over the sample prefix sums.
    let (mut sx2, mut sy2, mut sxy, mut sxz, mut syz) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let mut f2_integral = 0.0;
    let mut fprime2_integral = 0.0;
    for pair in samples.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let dx = cur.x - prev.x;
        let dy = cur.y - prev.y;
        f2_integral += dx * (prev.y * prev.y + prev.y * cur.y + cur.y * cur.y) / 3.0;
        fprime2_integral += dy * dy / dx;

        let x = cur.x - first.x;
        sx2 += x * x;
        sy2 += f2_integral * f2_integral;
        sxy += x * f2_integral;
        sxz += x * fprime2_integral;
        syz += f2_integral * fprime2_integral;
    }

    let c1 = sy2 * sxz - sxy * syz;
    let c2 = sxy * sxz - sx2 * syz;
    let c3 = sx2 * sy2 - sxy * sxy;

    if c2 == 0.0 || c3 == 0.0 || !(c1 / c2 > 0.0 && c2 / c3 > 0.0) {
        return fallback();
    }

    let amplitude = (c1 / c2).sqrt();
    let omega = (c2 / c3).sqrt();
    if amplitude.is_finite() && omega.is_finite() && omega > 0.0 {
        (amplitude, omega)
    } else {
        fallback()
    }
}

fn guess_phase(samples: &[Sample], omega: f64) -> f64 {
    let mut fc = 0.0;
    let mut fs = 0.0;
    for pair in samples.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let slope = (cur.y - prev.y) / (cur.x - prev.x);
        let (sin, cos) = (omega * cur.x).sin_cos();
        fc += omega * cur.y * cos - slope * sin;
        fs += omega * cur.y * sin + slope * cos;
    }
    if fc == 0.0 && fs == 0.0 {
        return 0.0;
    }
    (-fs).atan2(fc)
}

fn x_range(samples: &[Sample]) -> (f64, f64) {
    let first = samples.first().map(|s| s.x).unwrap_or(0.0);
    let last = samples.last().map(|s| s.x).unwrap_or(0.0);
    (first, last)
}
