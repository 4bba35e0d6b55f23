use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Required column '{field}' not found in universe listing. Available columns: {}",
        available.join(", ")
    )]
    MissingColumn { field: String, available: Vec<String> },

    #[error("Universe provider returned no securities")]
    EmptyUniverse,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed data: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
