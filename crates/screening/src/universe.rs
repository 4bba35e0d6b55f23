use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::warn;

use common::{Listing, ListingRow, Security};

use crate::schema::ResolvedSchema;

/// A ranked member of the run's universe.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseEntry {
    /// Zero-based capitalization rank; also the tie-break order downstream.
    pub rank: usize,
    pub security: Security,
    pub row: ListingRow,
}

/// Parse a capitalization cell, tolerating thousands separators.
fn parse_cap(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// The `n` rows with the largest capitalization, largest first.
///
/// The sort is stable, so equal capitalizations keep listing order. Rows whose
/// capitalization is missing or unparseable rank after every numeric value.
pub fn select_top<'a>(rows: &'a [ListingRow], n: usize, cap_column: &str) -> Vec<&'a ListingRow> {
    let mut ranked: Vec<(Option<f64>, &ListingRow)> = rows
        .iter()
        .map(|row| (row.get(cap_column).and_then(parse_cap), row))
        .collect();

    ranked.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ranked.into_iter().take(n).map(|(_, row)| row).collect()
}

/// Rank the listing and build the first `n` distinct securities.
///
/// Rows without a code are dropped; a repeated code keeps its highest-ranked
/// occurrence.
pub fn build_universe(listing: &Listing, schema: &ResolvedSchema, n: usize) -> Vec<UniverseEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(n.min(listing.len()));

    for row in select_top(&listing.rows, listing.len(), &schema.market_cap) {
        if entries.len() == n {
            break;
        }
        let Some(code) = row.get(&schema.code) else {
            warn!("Listing row without a security code — dropped");
            continue;
        };
        if !seen.insert(code.to_string()) {
            warn!(code = %code, "Duplicate security code in listing — keeping the larger listing");
            continue;
        }

        let cell = |column: &Option<String>| {
            column
                .as_deref()
                .and_then(|c| row.get(c))
                .map(str::to_string)
        };
        let security = Security {
            code: code.to_string(),
            name: cell(&schema.name).unwrap_or_else(|| code.to_string()),
            market: cell(&schema.market),
            sector: cell(&schema.sector),
        };
        entries.push(UniverseEntry {
            rank: entries.len(),
            security,
            row: row.clone(),
        });
    }

    entries
}
