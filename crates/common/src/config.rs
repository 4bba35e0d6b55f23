use chrono::NaiveDate;

use crate::{Error, Result};

/// Process-level settings loaded from environment variables once at startup.
///
/// Everything the screening core needs is passed down explicitly from here;
/// nothing below the binary reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    // Inputs
    pub listing_path: String,
    pub bars_dir: String,

    // Delivery
    pub output_dir: String,
    pub webhook_url: Option<String>,
    /// Opaque destination id handed to the sink (e.g. a folder id).
    pub destination: Option<String>,

    // Screening config file path
    pub screen_config_path: String,

    /// Overrides the run date used for history windows and file names.
    pub run_date: Option<NaiveDate>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` is this over `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                Error::Config(format!(
                    "Required environment variable '{key}' is not set. Check your .env file."
                ))
            })
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let run_date = optional("SCREENER_RUN_DATE")
            .map(|v| {
                NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|e| {
                    Error::Config(format!(
                        "SCREENER_RUN_DATE must be YYYY-MM-DD, got: '{v}' ({e})"
                    ))
                })
            })
            .transpose()?;

        Ok(Config {
            listing_path: required("SCREENER_LISTING_PATH")?,
            bars_dir: required("SCREENER_BARS_DIR")?,
            output_dir: optional("SCREENER_OUTPUT_DIR").unwrap_or_else(|| "out".to_string()),
            webhook_url: optional("SCREENER_WEBHOOK_URL"),
            destination: optional("SCREENER_DESTINATION"),
            screen_config_path: optional("SCREENER_CONFIG_PATH")
                .unwrap_or_else(|| "config/screener.toml".to_string()),
            run_date,
        })
    }
}
