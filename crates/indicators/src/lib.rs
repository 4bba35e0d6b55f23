pub mod config;
pub mod engine;
pub mod indicators;

pub use config::IndicatorParams;
pub use engine::{IndicatorEngine, IndicatorRow, IndicatorTable};
pub use indicators::{BollingerBands, MacdIndicator, MacdValue, RsiIndicator, Sma};
