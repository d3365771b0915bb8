pub mod args;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod sink;
pub mod stats;
pub mod utils;

pub use args::Args;
pub use config::PipelineConfig;
pub use fetch::{FetchError, Fetcher, RetryPolicy};
pub use merge::MergeStrategy;
pub use normalize::{canonical_form, is_excluded, ExtensionSet, DEFAULT_EXTENSIONS};
pub use pipeline::{run, run_domain, DomainOutcome};
pub use stats::{DomainStats, RunSummary};
