pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{Band, BollingerBands};
pub use macd::{MacdIndicator, MacdValue};
pub use rsi::RsiIndicator;
pub use sma::Sma;

/// Exponentially weighted mean over every value in `data`, seeded from the first
/// value with no bias adjustment: `y[0] = x[0]`, `y[t] = a·x[t] + (1 − a)·y[t−1]`.
pub(crate) fn ewm(data: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev: Option<f64> = None;
    for &x in data {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Smoothing factor for an EMA described by its span (`2 / (span + 1)`).
pub(crate) fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}
