pub mod csv_files;
pub mod sink;

pub use csv_files::{CsvBarStore, CsvListingProvider};
pub use sink::{DirectorySink, WebhookSink};
