use std::cmp::Ordering;

use common::Snapshot;

use crate::config::CandidateConfig;

/// Decides whether a snapshot makes the candidate list.
pub trait CandidateRule: Send + Sync {
    /// Human-readable rule name for logs.
    fn name(&self) -> &str;

    fn accepts(&self, snapshot: &Snapshot) -> bool;
}

/// Oversold (`RSI ≤ rsi_max`) or turning up (`MACD_hist > hist_min`).
///
/// An unavailable RSI or histogram fails its own branch.
#[derive(Debug, Clone)]
pub struct OversoldOrReversal {
    pub rsi_max: f64,
    pub hist_min: f64,
}

impl OversoldOrReversal {
    pub fn new(rsi_max: f64, hist_min: f64) -> Self {
        Self { rsi_max, hist_min }
    }
}

impl Default for OversoldOrReversal {
    fn default() -> Self {
        Self::from(&CandidateConfig::default())
    }
}

impl From<&CandidateConfig> for OversoldOrReversal {
    fn from(cfg: &CandidateConfig) -> Self {
        Self::new(cfg.rsi_max, cfg.hist_min)
    }
}

impl CandidateRule for OversoldOrReversal {
    fn name(&self) -> &str {
        "oversold-or-reversal"
    }

    fn accepts(&self, snapshot: &Snapshot) -> bool {
        let oversold = snapshot.rsi.is_some_and(|rsi| rsi <= self.rsi_max);
        let reversal = snapshot.macd_hist.is_some_and(|hist| hist > self.hist_min);
        oversold || reversal
    }
}

/// Rows accepted by `rule`, in input order.
pub fn filter_candidates(rows: &[Snapshot], rule: &dyn CandidateRule) -> Vec<Snapshot> {
    rows.iter().filter(|s| rule.accepts(s)).cloned().collect()
}

/// Stable sort by RSI ascending; rows without an RSI go last.
pub fn sort_by_rsi(rows: &mut [Snapshot]) {
    rows.sort_by(|a, b| match (a.rsi, b.rsi) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
