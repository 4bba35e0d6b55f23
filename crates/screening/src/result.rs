use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use common::Snapshot;

use crate::filter::{filter_candidates, sort_by_rsi, CandidateRule};

/// Why one security was left out of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    EmptySeries,
    TooShort { bars: usize, min_bars: usize },
    Fetch(String),
    Malformed(String),
    DuplicateCode,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptySeries => write!(f, "no bars returned"),
            SkipReason::TooShort { bars, min_bars } => {
                write!(f, "only {bars} bars (minimum {min_bars})")
            }
            SkipReason::Fetch(e) => write!(f, "fetch failed: {e}"),
            SkipReason::Malformed(e) => write!(f, "malformed series: {e}"),
            SkipReason::DuplicateCode => write!(f, "duplicate security code"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkipRecord {
    pub code: String,
    pub reason: SkipReason,
}

/// Result of processing one security.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Computed(Snapshot),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub universe_size: usize,
    pub processed: usize,
    /// In universe rank order.
    pub skipped: Vec<SkipRecord>,
    /// The run stopped before every security was processed.
    pub cancelled: bool,
}

impl RunStats {
    /// Securities never reached because the run was cancelled.
    pub fn unvisited(&self) -> usize {
        self.universe_size
            .saturating_sub(self.processed + self.skipped.len())
    }
}

/// Output of one run: the full table sorted by RSI and its candidate subset.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningResult {
    pub run_date: NaiveDate,
    pub full: Vec<Snapshot>,
    pub candidates: Vec<Snapshot>,
    /// Fundamental columns carried by every snapshot, in order.
    pub fundamental_labels: Vec<String>,
    pub stats: RunStats,
}

/// Append-only accumulator for per-security outcomes.
///
/// Outcomes may arrive in any order; they are keyed by universe rank so the
/// finished table does not depend on completion order.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    universe_size: usize,
    snapshots: BTreeMap<usize, Snapshot>,
    skipped: BTreeMap<usize, SkipRecord>,
    codes: HashSet<String>,
}

impl ResultBuilder {
    pub fn new(universe_size: usize) -> Self {
        Self {
            universe_size,
            ..Self::default()
        }
    }

    /// Record the outcome for the security at `rank`. A second snapshot for an
    /// already recorded code is turned into a skip.
    pub fn record(&mut self, rank: usize, code: &str, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Computed(snapshot) => {
                if self.codes.insert(code.to_string()) {
                    self.snapshots.insert(rank, snapshot);
                } else {
                    self.skip(rank, code, SkipReason::DuplicateCode);
                }
            }
            UnitOutcome::Skipped(reason) => self.skip(rank, code, reason),
        }
    }

    fn skip(&mut self, rank: usize, code: &str, reason: SkipReason) {
        self.skipped.insert(
            rank,
            SkipRecord {
                code: code.to_string(),
                reason,
            },
        );
    }

    pub fn processed(&self) -> usize {
        self.snapshots.len()
    }

    /// Sort, filter and freeze.
    pub fn finish(
        self,
        run_date: NaiveDate,
        fundamental_labels: Vec<String>,
        rule: &dyn CandidateRule,
        cancelled: bool,
    ) -> ScreeningResult {
        let processed = self.snapshots.len();
        let mut full: Vec<Snapshot> = self.snapshots.into_values().collect();
        sort_by_rsi(&mut full);
        let candidates = filter_candidates(&full, rule);

        ScreeningResult {
            run_date,
            full,
            candidates,
            fundamental_labels,
            stats: RunStats {
                universe_size: self.universe_size,
                processed,
                skipped: self.skipped.into_values().collect(),
                cancelled,
            },
        }
    }
}
