use chrono::NaiveDate;

use common::Bar;

use crate::config::IndicatorParams;
use crate::indicators::{BollingerBands, MacdIndicator, RsiIndicator, Sma};

/// Derived values at one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
}

/// Per-bar indicator table for one security, aligned with its bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    /// Row for the most recent bar.
    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs every configured indicator over one security's closing prices.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    sma_short: Sma,
    sma_long: Sma,
    rsi: RsiIndicator,
    bollinger: BollingerBands,
    macd: MacdIndicator,
}

impl IndicatorEngine {
    /// Panics on parameters that fail `IndicatorParams::validate`.
    pub fn new(params: &IndicatorParams) -> Self {
        Self {
            sma_short: Sma::new(params.sma_short),
            sma_long: Sma::new(params.sma_long),
            rsi: RsiIndicator::new(params.rsi_period),
            bollinger: BollingerBands::new(params.bb_period, params.bb_k),
            macd: MacdIndicator::new(params.macd_fast, params.macd_slow, params.macd_signal),
        }
    }

    /// Bars must be in ascending date order.
    pub fn compute(&self, bars: &[Bar]) -> IndicatorTable {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let sma_short = self.sma_short.series(&closes);
        let sma_long = self.sma_long.series(&closes);
        let rsi = self.rsi.series(&closes);
        let bands = self.bollinger.series(&closes);
        let macd = self.macd.series(&closes);

        let rows = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                date: bar.date,
                close: bar.close,
                sma_short: sma_short[i],
                sma_long: sma_long[i],
                rsi: rsi[i],
                bb_upper: bands[i].map(|b| b.upper),
                bb_lower: bands[i].map(|b| b.lower),
                macd: macd[i].macd,
                macd_signal: macd[i].signal,
                macd_hist: macd[i].hist,
            })
            .collect();

        IndicatorTable { rows }
    }

    /// Convenience for callers that only need the last row.
    pub fn latest(&self, bars: &[Bar]) -> Option<IndicatorRow> {
        self.compute(bars).rows.pop()
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(&IndicatorParams::default())
    }
}
