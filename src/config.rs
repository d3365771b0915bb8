use std::path::PathBuf;
use std::time::Duration;

use crate::args::Args;
use crate::fetch::{FetcherConfig, RetryPolicy};
use crate::merge::MergeStrategy;
use crate::normalize::ExtensionSet;

pub const ARCHIVE_CDX_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";

/// Immutable settings for a whole run, shared by every domain.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub extensions: ExtensionSet,
    pub placeholder: Option<String>,
    pub merge_strategy: MergeStrategy,
    pub stream: bool,
    /// Overrides the per-domain `<domain>.txt` output file.
    pub output: Option<PathBuf>,
    pub archive_endpoint: String,
    pub fetcher: FetcherConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extensions: ExtensionSet::default(),
            placeholder: None,
            merge_strategy: MergeStrategy::default(),
            stream: false,
            output: None,
            archive_endpoint: ARCHIVE_CDX_ENDPOINT.to_string(),
            fetcher: FetcherConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_args(args: &Args) -> Self {
        let retry = RetryPolicy {
            max_retries: args.retries,
            unit: Duration::from_millis(args.retry_unit_ms),
            ..RetryPolicy::default()
        };

        Self {
            extensions: ExtensionSet::new(&args.extensions),
            // An empty placeholder means "keep values", not "erase them".
            placeholder: args.placeholder.clone().filter(|p| !p.is_empty()),
            merge_strategy: if args.keep_values {
                MergeStrategy::AllValues
            } else {
                MergeStrategy::Representative
            },
            stream: args.stream,
            output: args.output.clone(),
            archive_endpoint: ARCHIVE_CDX_ENDPOINT.to_string(),
            fetcher: FetcherConfig {
                proxy: args.proxy.clone(),
                timeout: Duration::from_secs(args.timeout),
                retry,
            },
        }
    }

    pub fn output_path_for(&self, domain: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.txt", domain)))
    }
}
