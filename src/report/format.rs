//! Text formatting for exports and the interactive commands.
//!
//! Float lists use Rust's shortest round-trip formatting (`{:?}`), so `5.0`
//! stays `5.0` and `0.1` stays `0.1`.

use crate::app::engine::EngineState;
use crate::domain::{Description, Sample};

/// Four-line export text for the current state.
///
/// ```text
/// Function Formula (Wolfram Alpha Compatible): 0.01 x^2 + 0.4 x + 0.0
/// Function Degree: 2
/// Function Coefficients: [0.0, 0.4, 0.01]
/// Function Values: {10.0=5.0, 20.0=12.0, 30.0=21.0}
/// ```
pub fn format_export(state: &EngineState) -> String {
    let function = &state.function;
    let mut out = String::new();
    out.push_str(&format!(
        "Function Formula (Wolfram Alpha Compatible): {}\n",
        function.to_display_string()
    ));
    out.push_str(&format!("Function Degree: {}\n", function.degree()));
    out.push_str(&format!("Function Coefficients: {}\n", fmt_vec(function.coefficients())));
    out.push_str(&format!("Function Values: {}\n", format_values(state.samples.samples())));
    out
}

/// `[a, b, c]`
pub fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:?}")).collect();
    format!("[{}]", parts.join(", "))
}

/// `{x1=y1, x2=y2}` in sample order (ascending x).
pub fn format_values(samples: &[Sample]) -> String {
    let parts: Vec<String> = samples.iter().map(|s| format!("{:?}={:?}", s.x, s.y)).collect();
    format!("{{{}}}", parts.join(", "))
}

/// Multi-line summary for `pricefit describe`.
pub fn format_description(d: &Description) -> String {
    let mut out = String::new();
    out.push_str(&format!("Dataset: {}\n", d.dataset));
    out.push_str(&format!("Family: {}\n", d.family));
    if d.requested_degree != d.degree {
        out.push_str(&format!("Degree: {} (requested {})\n", d.degree, d.requested_degree));
    } else {
        out.push_str(&format!("Degree: {}\n", d.degree));
    }
    out.push_str(&format!("Coefficients: {}\n", fmt_vec(&d.coefficients)));
    out.push_str(&format!("Sizes: {}\n", fmt_vec(&d.xs)));
    out.push_str(&format!("Prices: {}\n", fmt_vec(&d.ys)));
    out
}

/// Evaluation line: exact value and value rounded to the nearest integer.
pub fn format_price(x: f64, y: f64) -> String {
    format!("Price for size {x:?}: {y:?} (rounded: {})", y.round())
}
