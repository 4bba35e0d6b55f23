use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading session of one security.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// A bar whose open/high/low all equal the close. Handy when only closes matter.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// A listed security as described by the universe listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    /// Unique exchange identifier, e.g. "005930".
    pub code: String,
    pub name: String,
    pub market: Option<String>,
    pub sector: Option<String>,
}

/// The raw universe table exactly as the provider returned it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub columns: Vec<String>,
    pub rows: Vec<ListingRow>,
}

impl Listing {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row given cells in column order. Missing trailing cells are left empty.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = self
            .columns
            .iter()
            .cloned()
            .zip(cells.into_iter().map(Into::into))
            .collect();
        self.rows.push(ListingRow { cells });
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// One listing row, keyed by the provider's own column header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRow {
    pub cells: HashMap<String, String>,
}

impl ListingRow {
    /// Raw cell under `column`, trimmed. Empty cells read as `None`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A fundamental value copied from the listing, or the explicit "not available" marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Value(String),
    NotAvailable,
}

impl FieldValue {
    pub const NOT_AVAILABLE: &'static str = "N/A";

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Value(v) => v,
            FieldValue::NotAvailable => Self::NOT_AVAILABLE,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FieldValue::Value(_))
    }

    /// Inverse of `as_str`: the sentinel text reads back as `NotAvailable`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == Self::NOT_AVAILABLE {
            FieldValue::NotAvailable
        } else {
            FieldValue::Value(raw.to_string())
        }
    }
}

impl<S: Into<String>> From<Option<S>> for FieldValue {
    fn from(value: Option<S>) -> Self {
        value.map_or(FieldValue::NotAvailable, |v| FieldValue::Value(v.into()))
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Latest derived values for one security.
///
/// Indicator fields are `None` when the series was too short for that
/// indicator's window. `date` is always the date of the last bar used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub code: String,
    pub name: String,
    pub close: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    /// Fundamental fields by output label, in resolution order.
    pub fundamentals: Vec<(String, FieldValue)>,
}

impl Snapshot {
    pub fn fundamental(&self, label: &str) -> Option<&FieldValue> {
        self.fundamentals
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }
}

/// A fully serialized table ready for a `DeliverySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Deterministic logical name, `<label>_<YYYYMMDD>.<ext>`.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
