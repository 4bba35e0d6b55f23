use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use common::{Bar, BarProvider, Error, Result, Security, Snapshot, UniverseProvider};
use indicators::{IndicatorEngine, IndicatorRow};

use crate::config::ScreenConfig;
use crate::filter::{CandidateRule, OversoldOrReversal};
use crate::fundamentals::{merge, merge_metadata};
use crate::result::{ResultBuilder, ScreeningResult, SkipReason, UnitOutcome};
use crate::schema::{ResolvedSchema, SchemaResolver};
use crate::universe::{build_universe, UniverseEntry};

/// Select universe → fetch bars → compute indicators → merge fundamentals →
/// sort and filter.
///
/// Per-security work runs concurrently up to `history.workers` units and never
/// fails the run; only the reduce step touches the accumulator.
pub struct ScreeningPipeline {
    config: ScreenConfig,
    universe: Arc<dyn UniverseProvider>,
    bars: Arc<dyn BarProvider>,
    engine: IndicatorEngine,
    rule: Box<dyn CandidateRule>,
}

impl ScreeningPipeline {
    pub fn new(
        config: ScreenConfig,
        universe: Arc<dyn UniverseProvider>,
        bars: Arc<dyn BarProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let engine = IndicatorEngine::new(&config.indicators);
        let rule = Box::new(OversoldOrReversal::from(&config.candidates));
        Ok(Self {
            config,
            universe,
            bars,
            engine,
            rule,
        })
    }

    /// Replace the default oversold-or-reversal rule.
    pub fn with_rule(mut self, rule: Box<dyn CandidateRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Run to completion.
    pub async fn run(&self, run_date: NaiveDate) -> Result<ScreeningResult> {
        self.run_until(run_date, std::future::pending()).await
    }

    /// Run until every security is processed or `shutdown` resolves.
    ///
    /// On shutdown the in-flight units are dropped and the result holds only
    /// the snapshots completed so far, with `stats.cancelled` set.
    pub async fn run_until<F>(&self, run_date: NaiveDate, shutdown: F) -> Result<ScreeningResult>
    where
        F: Future<Output = ()>,
    {
        let listing = self.universe.listing().await?;
        if listing.is_empty() {
            return Err(Error::EmptyUniverse);
        }

        let schema = SchemaResolver::new(&listing.columns).resolve_schema(&self.config.schema)?;
        let universe = build_universe(&listing, &schema, self.config.universe.size);
        if universe.is_empty() {
            return Err(Error::EmptyUniverse);
        }

        let start = run_date - Duration::days(self.config.history.calendar_days);
        info!(
            listed = listing.len(),
            universe = universe.len(),
            cap_column = %schema.market_cap,
            %start,
            rule = self.rule.name(),
            "Screening run started"
        );
        for field in schema.fundamentals.iter().filter(|f| f.column.is_none()) {
            warn!(field = %field.label, "Fundamental field not in listing — marked N/A");
        }

        let mut builder = ResultBuilder::new(universe.len());
        let resolved = &schema;
        let mut outcomes = stream::iter(&universe)
            .map(|entry| async move {
                let outcome = self.process(entry, resolved, start).await;
                (entry, outcome)
            })
            .buffer_unordered(self.config.history.workers);

        tokio::pin!(shutdown);
        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!(
                        completed = builder.processed(),
                        "Shutdown requested — keeping completed snapshots"
                    );
                    cancelled = true;
                    break;
                }
                next = outcomes.next() => {
                    let Some((entry, outcome)) = next else { break };
                    let code = &entry.security.code;
                    match &outcome {
                        UnitOutcome::Computed(_) => debug!(code = %code, "Snapshot computed"),
                        UnitOutcome::Skipped(reason) => {
                            warn!(code = %code, name = %entry.security.name, %reason, "Skipping security")
                        }
                    }
                    builder.record(entry.rank, code, outcome);
                }
            }
        }
        drop(outcomes);

        let result = builder.finish(
            run_date,
            schema.fundamental_labels(),
            self.rule.as_ref(),
            cancelled,
        );
        info!(
            processed = result.stats.processed,
            skipped = result.stats.skipped.len(),
            candidates = result.candidates.len(),
            cancelled,
            "Screening run finished"
        );
        Ok(result)
    }

    async fn process(
        &self,
        entry: &UniverseEntry,
        schema: &ResolvedSchema,
        start: NaiveDate,
    ) -> UnitOutcome {
        let code = &entry.security.code;
        let bars = match self.bars.daily_bars(code, start).await {
            Ok(bars) => bars,
            Err(e) => return UnitOutcome::Skipped(SkipReason::Fetch(e.to_string())),
        };

        if bars.is_empty() {
            return UnitOutcome::Skipped(SkipReason::EmptySeries);
        }
        if let Err(e) = validate_bars(&bars) {
            return UnitOutcome::Skipped(SkipReason::Malformed(e));
        }
        let min_bars = self.config.history.min_bars;
        if bars.len() < min_bars {
            return UnitOutcome::Skipped(SkipReason::TooShort {
                bars: bars.len(),
                min_bars,
            });
        }

        match self.engine.latest(&bars) {
            Some(row) => {
                let snapshot = snapshot_from(&entry.security, &row);
                let snapshot = merge(snapshot, &entry.row, &schema.fundamentals);
                UnitOutcome::Computed(merge_metadata(snapshot, &entry.security))
            }
            None => UnitOutcome::Skipped(SkipReason::EmptySeries),
        }
    }
}

/// Dates strictly ascending and closes finite.
fn validate_bars(bars: &[Bar]) -> std::result::Result<(), String> {
    if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(format!("bar dated {} follows {}", w[1].date, w[0].date));
    }
    if let Some(bar) = bars.iter().find(|b| !b.close.is_finite()) {
        return Err(format!("non-finite close on {}", bar.date));
    }
    Ok(())
}

fn snapshot_from(security: &Security, row: &IndicatorRow) -> Snapshot {
    Snapshot {
        date: row.date,
        code: security.code.clone(),
        name: security.name.clone(),
        close: row.close,
        sma_short: row.sma_short,
        sma_long: row.sma_long,
        rsi: row.rsi,
        bb_upper: row.bb_upper,
        bb_lower: row.bb_lower,
        macd: row.macd,
        macd_signal: row.macd_signal,
        macd_hist: row.macd_hist,
        fundamentals: Vec::new(),
    }
}
