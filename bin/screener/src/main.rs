use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adapters::{CsvBarStore, CsvListingProvider, DirectorySink, WebhookSink};
use common::{Config, DeliverySink};
use screening::{Report, ScreenConfig, ScreeningPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env()?;
    let screen_cfg = ScreenConfig::load(&cfg.screen_config_path)
        .with_context(|| format!("loading screening config '{}'", cfg.screen_config_path))?;
    let run_date = cfg
        .run_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    info!(%run_date, universe = screen_cfg.universe.size, "Screener starting");

    // ── Providers ─────────────────────────────────────────────────────────────
    let universe = Arc::new(CsvListingProvider::new(&cfg.listing_path));
    let bars = Arc::new(CsvBarStore::new(&cfg.bars_dir));

    // ── Sink (webhook when configured, otherwise local directory) ────────────
    let sink: Box<dyn DeliverySink> = match &cfg.webhook_url {
        Some(url) => {
            info!("Delivering to webhook");
            Box::new(WebhookSink::new(url.as_str())?)
        }
        None => {
            info!(dir = %cfg.output_dir, "Delivering to local directory");
            Box::new(DirectorySink::new(&cfg.output_dir))
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let pipeline = ScreeningPipeline::new(screen_cfg, universe, bars)?;
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // no signal handler available: never cancel
            std::future::pending::<()>().await;
        }
    };
    let result = pipeline
        .run_until(run_date, shutdown)
        .await
        .context("screening run aborted")?;
    if result.stats.cancelled {
        warn!(
            unvisited = result.stats.unvisited(),
            "Run interrupted — delivering partial tables"
        );
    }

    // ── Delivery ──────────────────────────────────────────────────────────────
    let report = Report::build(&result, pipeline.config())?;
    report
        .deliver(sink.as_ref(), cfg.destination.as_deref())
        .await
        .context("delivering result tables")?;

    info!(
        rows = result.full.len(),
        candidates = result.candidates.len(),
        skipped = result.stats.skipped.len(),
        "Screener finished"
    );
    Ok(())
}
