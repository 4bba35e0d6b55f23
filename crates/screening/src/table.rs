use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use common::{Error, FieldValue, Result, Snapshot};
use indicators::IndicatorParams;

use crate::config::OutputFormat;

/// Spreadsheet tools need the BOM to detect UTF-8 (non-ASCII names).
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Columns before the fundamental fields.
pub const FIXED_COLUMNS: usize = 12;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column headers for one run: the fixed indicator columns, then fundamentals.
pub fn headers(params: &IndicatorParams, fundamental_labels: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = vec![
        "Date".into(),
        "Code".into(),
        "Name".into(),
        "Close".into(),
        format!("SMA{}", params.sma_short),
        format!("SMA{}", params.sma_long),
        "RSI".into(),
        "BB_Upper".into(),
        "BB_Lower".into(),
        "MACD".into(),
        "MACD_Signal".into(),
        "MACD_Hist".into(),
    ];
    columns.extend(fundamental_labels.iter().cloned());
    columns
}

/// `<label>_<YYYYMMDD>.<ext>`
pub fn artifact_name(label: &str, run_date: NaiveDate, format: OutputFormat) -> String {
    format!(
        "{label}_{}.{}",
        run_date.format("%Y%m%d"),
        format.extension()
    )
}

/// A rendered table: every cell already formatted as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn number(value: f64) -> String {
    // `Display` for f64 is the shortest text that parses back to the same value
    value.to_string()
}

fn optional_number(value: Option<f64>) -> String {
    value.map(number).unwrap_or_default()
}

impl OutputTable {
    pub fn from_snapshots(
        snapshots: &[Snapshot],
        params: &IndicatorParams,
        fundamental_labels: &[String],
    ) -> Self {
        let rows = snapshots
            .iter()
            .map(|s| {
                let mut row = vec![
                    s.date.format(DATE_FORMAT).to_string(),
                    s.code.clone(),
                    s.name.clone(),
                    number(s.close),
                    optional_number(s.sma_short),
                    optional_number(s.sma_long),
                    optional_number(s.rsi),
                    optional_number(s.bb_upper),
                    optional_number(s.bb_lower),
                    optional_number(s.macd),
                    optional_number(s.macd_signal),
                    optional_number(s.macd_hist),
                ];
                row.extend(fundamental_labels.iter().map(|label| {
                    s.fundamental(label)
                        .map(|v| v.as_str())
                        .unwrap_or(FieldValue::NOT_AVAILABLE)
                        .to_string()
                }));
                row
            })
            .collect();

        Self {
            columns: headers(params, fundamental_labels),
            rows,
        }
    }

    /// Parse rendered rows back into snapshots.
    pub fn to_snapshots(&self) -> Result<Vec<Snapshot>> {
        if self.columns.len() < FIXED_COLUMNS {
            return Err(Error::Malformed(format!(
                "expected at least {FIXED_COLUMNS} columns, found {}",
                self.columns.len()
            )));
        }
        let labels = &self.columns[FIXED_COLUMNS..];

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != self.columns.len() {
                    return Err(Error::Malformed(format!(
                        "row {i} has {} cells, expected {}",
                        row.len(),
                        self.columns.len()
                    )));
                }
                let date = NaiveDate::parse_from_str(&row[0], DATE_FORMAT)
                    .map_err(|e| Error::Malformed(format!("row {i}: bad date '{}': {e}", row[0])))?;
                let close = parse_number(&row[3])?
                    .ok_or_else(|| Error::Malformed(format!("row {i}: missing close")))?;

                Ok(Snapshot {
                    date,
                    code: row[1].clone(),
                    name: row[2].clone(),
                    close,
                    sma_short: parse_number(&row[4])?,
                    sma_long: parse_number(&row[5])?,
                    rsi: parse_number(&row[6])?,
                    bb_upper: parse_number(&row[7])?,
                    bb_lower: parse_number(&row[8])?,
                    macd: parse_number(&row[9])?,
                    macd_signal: parse_number(&row[10])?,
                    macd_hist: parse_number(&row[11])?,
                    fundamentals: labels
                        .iter()
                        .zip(&row[FIXED_COLUMNS..])
                        .map(|(label, cell)| (label.clone(), FieldValue::parse(cell)))
                        .collect(),
                })
            })
            .collect()
    }

    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
        }
    }

    pub fn decode(bytes: &[u8], format: OutputFormat) -> Result<Self> {
        match format {
            OutputFormat::Csv => Self::from_csv(bytes),
            OutputFormat::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }

    fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    fn from_csv(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::Reader::from_reader(bytes);
        let columns = reader.headers()?.iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|record| -> Result<Vec<String>> {
                Ok(record?.iter().map(String::from).collect())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns, rows })
    }
}

fn parse_number(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| Error::Malformed(format!("bad number '{raw}': {e}")))
}
