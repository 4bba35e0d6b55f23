use super::{ewm, span_alpha};

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// Computes: MACD line = EMA(fast) − EMA(slow), Signal = EMA(macd_line, signal_period),
/// Histogram = MACD − Signal. Every EMA is seeded from the first value so no bar
/// ever sees later data.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// MACD components at one bar. Line, signal and histogram are all reported
/// from `slow` closes. The signal runs over the line from the first close, so
/// it is still settling until `slow + signal` closes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdValue {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub hist: Option<f64>,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(
            fast < slow,
            "MACD fast period must be less than slow period"
        );
        Self { fast, slow, signal }
    }

    /// Closes needed before any component is reported.
    pub fn min_len(&self) -> usize {
        self.slow
    }

    /// One value per close (oldest first).
    pub fn series(&self, closes: &[f64]) -> Vec<MacdValue> {
        let fast = ewm(closes, span_alpha(self.fast));
        let slow = ewm(closes, span_alpha(self.slow));
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ewm(&line, span_alpha(self.signal));

        (0..closes.len())
            .map(|i| {
                if i + 1 < self.min_len() {
                    return MacdValue::default();
                }
                MacdValue {
                    macd: Some(line[i]),
                    signal: Some(signal[i]),
                    hist: Some(line[i] - signal[i]),
                }
            })
            .collect()
    }

    /// MACD components at the most recent close.
    pub fn compute(&self, closes: &[f64]) -> MacdValue {
        self.series(closes).last().copied().unwrap_or_default()
    }
}
