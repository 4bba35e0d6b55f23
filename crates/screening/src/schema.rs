use common::{Error, Result};

use crate::config::SchemaConfig;

/// First column in `available` matching any of `candidates`, trying candidates in
/// priority order. Matching ignores case and surrounding whitespace; the column is
/// returned exactly as spelled in `available`.
pub fn resolve<'a, S: AsRef<str>>(candidates: &[S], available: &'a [String]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        let wanted = normalize(candidate.as_ref());
        available
            .iter()
            .find(|column| normalize(column) == wanted)
            .map(String::as_str)
    })
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Output columns carrying the security's sector and market segment, written
/// after the configured fundamentals.
pub const SECTOR_LABEL: &str = "Sector";
pub const MARKET_LABEL: &str = "Market";

/// An optional field and the listing column it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub label: String,
    pub column: Option<String>,
}

/// Actual listing headers for every logical field of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub market_cap: String,
    pub code: String,
    pub name: Option<String>,
    pub market: Option<String>,
    pub sector: Option<String>,
    pub fundamentals: Vec<ResolvedField>,
}

impl ResolvedSchema {
    /// Output labels after the indicator columns: configured fundamentals in
    /// resolution order, then sector and market.
    pub fn fundamental_labels(&self) -> Vec<String> {
        self.fundamentals
            .iter()
            .map(|f| f.label.clone())
            .chain([SECTOR_LABEL.to_string(), MARKET_LABEL.to_string()])
            .collect()
    }
}

/// Resolves logical fields against the headers of one listing.
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    columns: &'a [String],
}

impl<'a> SchemaResolver<'a> {
    pub fn new(columns: &'a [String]) -> Self {
        Self { columns }
    }

    pub fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&'a str> {
        resolve(candidates, self.columns)
    }

    /// Like `resolve`, but a miss is fatal and names what was available.
    pub fn require<S: AsRef<str>>(&self, field: &str, candidates: &[S]) -> Result<&'a str> {
        self.resolve(candidates).ok_or_else(|| Error::MissingColumn {
            field: format!(
                "{field} ({})",
                candidates
                    .iter()
                    .map(|c| c.as_ref())
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            available: self.columns.to_vec(),
        })
    }

    /// Market capitalization and code are mandatory; everything else degrades to
    /// "not available".
    pub fn resolve_schema(&self, cfg: &SchemaConfig) -> Result<ResolvedSchema> {
        let market_cap = self.require("market capitalization", &cfg.market_cap)?;
        let code = self.require("security code", &cfg.code)?;
        let optional = |aliases: &[String]| self.resolve(aliases).map(str::to_string);

        Ok(ResolvedSchema {
            market_cap: market_cap.to_string(),
            code: code.to_string(),
            name: optional(&cfg.name),
            market: optional(&cfg.market),
            sector: optional(&cfg.sector),
            fundamentals: cfg
                .fundamentals
                .iter()
                .map(|spec| ResolvedField {
                    label: spec.label.clone(),
                    column: optional(&spec.aliases),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_ignores_case_and_whitespace() {
        let available = cols(&[" per "]);
        assert_eq!(resolve(&["PER"], &available), Some(" per "));
    }

    #[test]
    fn resolve_respects_candidate_priority() {
        let available = cols(&["MarketCap", "Marcap"]);
        // "MarCap" matches "Marcap" case-insensitively before "MarketCap" is tried
        assert_eq!(resolve(&["MarCap", "MarketCap"], &available), Some("Marcap"));
        assert_eq!(resolve(&["MarketCap", "MarCap"], &available), Some("MarketCap"));
    }

    #[test]
    fn resolve_tries_every_candidate_before_failing() {
        let available = cols(&["Code", "Name", "marketcap"]);
        assert_eq!(resolve(&["MarCap", "Market_Cap", "MarketCap"], &available), Some("marketcap"));
        assert_eq!(resolve(&["PER", "P/E"], &available), None);
        assert_eq!(resolve::<&str>(&[], &available), None);
    }

    #[test]
    fn missing_market_cap_is_fatal_and_lists_columns() {
        let available = cols(&["Code", "Name", "Close"]);
        let err = SchemaResolver::new(&available)
            .resolve_schema(&SchemaConfig::default())
            .unwrap_err();
        match err {
            Error::MissingColumn { field, available } => {
                assert!(field.contains("market capitalization"));
                assert!(field.contains("MarCap"));
                assert_eq!(available, cols(&["Code", "Name", "Close"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn optional_fields_degrade_to_unresolved() {
        let available = cols(&["Code", "Name", "Marcap", "per", "Market"]);
        let schema = SchemaResolver::new(&available)
            .resolve_schema(&SchemaConfig::default())
            .unwrap();
        assert_eq!(schema.market_cap, "Marcap");
        assert_eq!(schema.market.as_deref(), Some("Market"));
        assert!(schema.sector.is_none());

        let per = &schema.fundamentals[0];
        assert_eq!(per.label, "PER");
        assert_eq!(per.column.as_deref(), Some("per"));
        let pbr = &schema.fundamentals[1];
        assert_eq!(pbr.label, "PBR");
        assert!(pbr.column.is_none());
        assert_eq!(
            schema.fundamental_labels(),
            cols(&["PER", "PBR", "ROE", "DebtRatio", "Sector", "Market"])
        );
    }

    #[test]
    fn korean_headers_resolve() {
        let available = cols(&["종목코드", "종목명", "시가총액", "업종"]);
        let schema = SchemaResolver::new(&available)
            .resolve_schema(&SchemaConfig::default())
            .unwrap();
        assert_eq!(schema.code, "종목코드");
        assert_eq!(schema.name.as_deref(), Some("종목명"));
        assert_eq!(schema.sector.as_deref(), Some("업종"));
        assert!(schema.market.is_none());
    }
}
