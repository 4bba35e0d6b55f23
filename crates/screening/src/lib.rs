pub mod config;
pub mod filter;
pub mod fundamentals;
pub mod pipeline;
pub mod report;
pub mod result;
pub mod schema;
pub mod table;
pub mod universe;

pub use config::{FieldSpec, OutputFormat, ScreenConfig, SchemaConfig};
pub use filter::{filter_candidates, sort_by_rsi, CandidateRule, OversoldOrReversal};
pub use pipeline::ScreeningPipeline;
pub use report::Report;
pub use result::{ResultBuilder, RunStats, ScreeningResult, SkipReason, SkipRecord, UnitOutcome};
pub use schema::{resolve, ResolvedField, ResolvedSchema, SchemaResolver};
pub use table::{artifact_name, OutputTable};
pub use universe::{build_universe, select_top, UniverseEntry};
