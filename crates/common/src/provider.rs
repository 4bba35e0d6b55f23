use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{Bar, Listing, Payload, Result};

/// Source of the security listing for one run.
///
/// Column headers are passed through exactly as the provider spells them;
/// the screening crate resolves them, never the provider.
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    async fn listing(&self) -> Result<Listing>;
}

/// Source of daily OHLC bars.
///
/// Rate limiting and backoff belong to the implementation. An empty vector is
/// a normal answer for delisted or illiquid securities.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Bars for `code` dated on or after `start`, oldest first.
    async fn daily_bars(&self, code: &str, start: NaiveDate) -> Result<Vec<Bar>>;
}

/// Destination for serialized result tables.
///
/// `DirectorySink` in `crates/adapters` covers local runs;
/// `WebhookSink` hands the payload to a remote endpoint.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, payload: &Payload, destination: Option<&str>) -> Result<()>;
}
