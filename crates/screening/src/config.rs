use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};
use indicators::IndicatorParams;

use crate::schema::{MARKET_LABEL, SECTOR_LABEL};

/// Top-level screening config file (TOML). Every key is optional.
///
/// Example `config/screener.toml`:
/// ```toml
/// [universe]
/// size = 1000
///
/// [history]
/// calendar_days = 100
/// min_bars = 20
/// workers = 8
///
/// [candidates]
/// rsi_max = 35.0
///
/// [output]
/// format = "csv"
///
/// [[schema.fundamentals]]
/// label = "PER"
/// aliases = ["PER"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub universe: UniverseConfig,
    pub history: HistoryConfig,
    pub indicators: IndicatorParams,
    pub candidates: CandidateConfig,
    pub output: OutputConfig,
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Number of securities kept after ranking by capitalization.
    pub size: usize,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self { size: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Calendar days of bars requested, counted back from the run date.
    pub calendar_days: i64,
    /// Securities with fewer bars than this are skipped.
    pub min_bars: usize,
    /// Concurrent per-security fetch+compute units.
    pub workers: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            calendar_days: 100,
            min_bars: 20,
            workers: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// RSI at or below this is oversold.
    pub rsi_max: f64,
    /// MACD histogram strictly above this is a reversal.
    pub hist_min: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            rsi_max: 35.0,
            hist_min: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv; charset=utf-8",
            OutputFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Label of the full table artifact.
    pub full_label: String,
    /// Label of the candidate subset artifact.
    pub candidates_label: String,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            full_label: "stock_analysis".to_string(),
            candidates_label: "stock_candidates".to_string(),
            format: OutputFormat::Csv,
        }
    }
}

/// Accepted header spellings per logical field, highest priority first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub market_cap: Vec<String>,
    pub code: Vec<String>,
    pub name: Vec<String>,
    /// Market segment and sector are kept on the security and written as the
    /// `Market` / `Sector` columns after the fundamentals.
    pub market: Vec<String>,
    pub sector: Vec<String>,
    /// Optional fields copied onto every snapshot, in output order.
    pub fundamentals: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldSpec {
    /// Output column name.
    pub label: String,
    pub aliases: Vec<String>,
}

impl FieldSpec {
    pub fn new(label: &str, aliases: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            aliases: strings(aliases),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            market_cap: strings(&["MarCap", "MarketCap", "Marcap", "Market Cap", "시가총액"]),
            code: strings(&["Code", "Symbol", "Ticker", "종목코드"]),
            name: strings(&["Name", "종목명"]),
            market: strings(&["Market", "MarketName", "Exchange", "시장구분"]),
            sector: strings(&["Sector", "Industry", "업종"]),
            fundamentals: vec![
                FieldSpec::new("PER", &["PER", "P/E"]),
                FieldSpec::new("PBR", &["PBR", "P/B"]),
                FieldSpec::new("ROE", &["ROE"]),
                FieldSpec::new("DebtRatio", &["DebtRatio", "Debt Ratio", "부채비율"]),
            ],
        }
    }
}

impl ScreenConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Screening config not found — using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        if self.universe.size == 0 {
            return Err(Error::Config("universe.size must be >= 1".into()));
        }
        if self.history.calendar_days <= 0 {
            return Err(Error::Config(format!(
                "history.calendar_days must be positive, got {}",
                self.history.calendar_days
            )));
        }
        if self.history.min_bars == 0 {
            return Err(Error::Config("history.min_bars must be >= 1".into()));
        }
        if self.history.workers == 0 {
            return Err(Error::Config("history.workers must be >= 1".into()));
        }
        if !self.candidates.rsi_max.is_finite() || !self.candidates.hist_min.is_finite() {
            return Err(Error::Config("candidate thresholds must be finite".into()));
        }
        if self.schema.market_cap.is_empty() || self.schema.code.is_empty() {
            return Err(Error::Config(
                "schema.market_cap and schema.code need at least one alias".into(),
            ));
        }
        if let Some(field) = self.schema.fundamentals.iter().find(|f| {
            let label = f.label.trim();
            label.is_empty()
                || label.eq_ignore_ascii_case(SECTOR_LABEL)
                || label.eq_ignore_ascii_case(MARKET_LABEL)
        }) {
            return Err(Error::Config(format!(
                "fundamental label '{}' is empty or reserved for security metadata",
                field.label
            )));
        }
        if self.output.full_label.trim().is_empty() || self.output.candidates_label.trim().is_empty()
        {
            return Err(Error::Config("output labels must not be empty".into()));
        }
        Ok(())
    }
}
