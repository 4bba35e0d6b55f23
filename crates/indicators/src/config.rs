use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Indicator parameters, usually read from the `[indicators]` table of the
/// screening config file.
///
/// ```toml
/// [indicators]
/// sma_short = 20
/// sma_long = 60
/// rsi_period = 14
/// bb_period = 20
/// bb_k = 2.0
/// macd_fast = 12
/// macd_slow = 26
/// macd_signal = 9
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_k: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 60,
            rsi_period: 14,
            bb_period: 20,
            bb_k: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorParams {
    /// Reject parameter sets the indicator constructors would refuse.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Config(msg));
        if self.sma_short == 0 || self.sma_long == 0 {
            return fail("SMA windows must be >= 1".into());
        }
        if self.rsi_period < 2 {
            return fail(format!("rsi_period must be >= 2, got {}", self.rsi_period));
        }
        if self.bb_period < 2 {
            return fail(format!("bb_period must be >= 2, got {}", self.bb_period));
        }
        if !self.bb_k.is_finite() || self.bb_k < 0.0 {
            return fail(format!("bb_k must be a non-negative number, got {}", self.bb_k));
        }
        if self.macd_fast == 0 || self.macd_signal == 0 {
            return fail("MACD periods must be >= 1".into());
        }
        if self.macd_fast >= self.macd_slow {
            return fail(format!(
                "macd_fast ({}) must be less than macd_slow ({})",
                self.macd_fast, self.macd_slow
            ));
        }
        Ok(())
    }
}
