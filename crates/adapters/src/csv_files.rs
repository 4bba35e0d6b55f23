use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use common::{Bar, BarProvider, Error, Listing, Result, UniverseProvider};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Universe listing read from one CSV file. Headers are kept verbatim.
pub struct CsvListingProvider {
    path: PathBuf,
}

impl CsvListingProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UniverseProvider for CsvListingProvider {
    async fn listing(&self) -> Result<Listing> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::Provider(format!("cannot read listing '{}': {e}", self.path.display()))
        })?;
        let listing = parse_listing(strip_bom(&bytes))?;
        debug!(path = %self.path.display(), rows = listing.len(), "Listing loaded");
        Ok(listing)
    }
}

fn parse_listing(bytes: &[u8]) -> Result<Listing> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let columns = reader.headers()?.iter().map(String::from).collect();
    let mut listing = Listing::new(columns);
    for record in reader.records() {
        listing.push_row(record?.iter());
    }
    Ok(listing)
}

/// Daily bars stored as `<dir>/<code>.csv`.
///
/// Expected headers (any case): `Date`, `Close`, and optionally `Open`, `High`,
/// `Low`, `Volume`. A missing file is an empty series.
pub struct CsvBarStore {
    dir: PathBuf,
}

impl CsvBarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, code: &str) -> Result<PathBuf> {
        let file = Path::new(code);
        let plain = file.components().count() == 1 && file.file_name().is_some();
        if code.is_empty() || !plain {
            return Err(Error::Provider(format!("invalid security code '{code}'")));
        }
        Ok(self.dir.join(format!("{code}.csv")))
    }
}

#[async_trait]
impl BarProvider for CsvBarStore {
    async fn daily_bars(&self, code: &str, start: NaiveDate) -> Result<Vec<Bar>> {
        let path = self.path_for(code)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Provider(format!("cannot read '{}': {e}", path.display())))
            }
        };
        let mut bars = parse_bars(strip_bom(&bytes))?;
        bars.retain(|b| b.date >= start);
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Column positions for one bar file.
struct BarColumns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl BarColumns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| Error::Malformed(format!("bar file has no '{name}' column")))
        };
        Ok(Self {
            date: required("date")?,
            close: required("close")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

fn parse_bars(bytes: &[u8]) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let cols = BarColumns::locate(reader.headers()?)?;

    let mut bars = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
        let number = |idx: usize| {
            cell(idx)
                .replace(',', "")
                .parse::<f64>()
                .map_err(|e| Error::Malformed(format!("row {}: bad number '{}': {e}", line + 1, cell(idx))))
        };
        let optional = |idx: Option<usize>, fallback: f64| match idx {
            Some(i) if !cell(i).is_empty() => number(i),
            _ => Ok(fallback),
        };

        let date = parse_date(cell(cols.date))
            .ok_or_else(|| Error::Malformed(format!("row {}: bad date '{}'", line + 1, cell(cols.date))))?;
        let close = number(cols.close)?;
        bars.push(Bar {
            date,
            open: optional(cols.open, close)?,
            high: optional(cols.high, close)?,
            low: optional(cols.low, close)?,
            close,
            volume: optional(cols.volume, 0.0)?,
        });
    }
    Ok(bars)
}

/// `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_headers_are_case_insensitive_and_optional_columns_default() {
        let csv = "date,CLOSE,Volume\n2024-01-03,101.5,1200\n2024-01-02 00:00:00,100,\n";
        let bars = parse_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 101.5);
        assert_eq!(bars[0].open, 101.5);
        assert_eq!(bars[0].volume, 1200.0);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn bar_file_without_close_is_malformed() {
        let err = parse_bars("Date,Open\n2024-01-02,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn bad_number_names_the_row() {
        let err = parse_bars("Date,Close\n2024-01-02,abc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"), "got: {err}");
    }

    #[test]
    fn listing_keeps_headers_verbatim() {
        let listing = parse_listing(" Code ,종목명,Marcap\n005930,삼성전자,\"400,000\"\n".as_bytes()).unwrap();
        assert_eq!(listing.columns, vec![" Code ", "종목명", "Marcap"]);
        assert_eq!(listing.rows[0].get("종목명"), Some("삼성전자"));
        assert_eq!(listing.rows[0].get("Marcap"), Some("400,000"));
    }

    #[test]
    fn codes_cannot_escape_the_directory() {
        let store = CsvBarStore::new("/data/bars");
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("a/b").is_err());
        assert!(store.path_for("").is_err());
        assert_eq!(store.path_for("005930").unwrap(), PathBuf::from("/data/bars/005930.csv"));
    }
}
