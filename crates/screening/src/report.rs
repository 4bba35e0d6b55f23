use tracing::info;

use common::{DeliverySink, Payload, Result};

use crate::config::ScreenConfig;
use crate::result::ScreeningResult;
use crate::table::{artifact_name, OutputTable};

/// Both serialized tables of one run.
///
/// Built in full before any delivery starts, so a failed delivery can be
/// retried from the same report without recomputing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub full: Payload,
    pub candidates: Payload,
}

impl Report {
    pub fn build(result: &ScreeningResult, config: &ScreenConfig) -> Result<Self> {
        let format = config.output.format;
        let render = |label: &str, rows: &[common::Snapshot]| -> Result<Payload> {
            let table =
                OutputTable::from_snapshots(rows, &config.indicators, &result.fundamental_labels);
            Ok(Payload {
                file_name: artifact_name(label, result.run_date, format),
                content_type: format.content_type().to_string(),
                bytes: table.encode(format)?,
            })
        };

        Ok(Self {
            full: render(&config.output.full_label, &result.full)?,
            candidates: render(&config.output.candidates_label, &result.candidates)?,
        })
    }

    pub fn payloads(&self) -> [&Payload; 2] {
        [&self.full, &self.candidates]
    }

    /// Hand both payloads to `sink`, full table first.
    pub async fn deliver(&self, sink: &dyn DeliverySink, destination: Option<&str>) -> Result<()> {
        for payload in self.payloads() {
            sink.deliver(payload, destination).await?;
            info!(
                file = %payload.file_name,
                bytes = payload.bytes.len(),
                destination = destination.unwrap_or("-"),
                "Delivered table"
            );
        }
        Ok(())
    }
}
