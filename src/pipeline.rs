use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::fetch::Fetcher;
use crate::merge;
use crate::query;
use crate::sink::OutputSink;
use crate::stats::{DomainStats, RunSummary};

#[derive(Debug)]
pub enum DomainOutcome {
    Completed { stats: DomainStats, output: PathBuf },
    /// The archive could not be fetched; nothing was written.
    Skipped { reason: String },
}

#[derive(Debug)]
pub struct ProcessedUrls {
    pub urls: Vec<String>,
    pub stats: DomainStats,
}

/// CDX query listing every archived URL under `domain`, one original URL per
/// line, collapsed by URL key.
pub fn archive_query_url(endpoint: &str, domain: &str) -> String {
    format!(
        "{}?url={}/*&output=txt&collapse=urlkey&fl=original&page=/",
        endpoint, domain
    )
}

/// Turns an archive response body into the merged URL list.
pub fn process_body(body: &str, config: &PipelineConfig) -> ProcessedUrls {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    let cleaned = query::process(
        &tokens,
        &config.extensions,
        config.placeholder.as_deref(),
    );
    let urls = merge::merge(&cleaned.urls, config.merge_strategy);

    let stats = DomainStats {
        raw_urls: tokens.len(),
        malformed: cleaned.malformed,
        excluded: cleaned.excluded,
        cleaned: cleaned.urls.len(),
        merged: urls.len(),
    };
    ProcessedUrls { urls, stats }
}

/// Fetches, cleans, merges and writes one domain.
///
/// A fetch failure yields `DomainOutcome::Skipped`; only output errors are
/// returned as `Err`.
pub fn run_domain(
    fetcher: &Fetcher,
    domain: &str,
    config: &PipelineConfig,
) -> Result<DomainOutcome> {
    let start_time = Instant::now();
    info!(action = "fetch", component = "pipeline", domain, "Fetching URLs");

    let query_url = archive_query_url(&config.archive_endpoint, domain);
    let body = match fetcher.fetch(&query_url) {
        Ok(body) => body,
        Err(e) => {
            error!(action = "skip", component = "pipeline", domain, error = %e, "Failed to fetch URLs");
            return Ok(DomainOutcome::Skipped {
                reason: e.to_string(),
            });
        }
    };

    let processed = process_body(&body, config);
    let stats = processed.stats;
    info!(
        action = "process",
        component = "pipeline",
        domain,
        raw_urls = stats.raw_urls,
        cleaned = stats.cleaned,
        merged = stats.merged,
        "Processed archive URLs"
    );

    let output = config.output_path_for(domain);
    OutputSink::new(&output, config.stream)
        .write(&processed.urls)
        .with_context(|| format!("Failed to save URLs for {}", domain))?;

    info!(
        action = "complete",
        component = "pipeline",
        domain,
        duration_ms = start_time.elapsed().as_millis(),
        "Domain completed"
    );
    Ok(DomainOutcome::Completed { stats, output })
}

/// Processes every domain in order. A domain whose fetch fails is skipped and
/// the rest continue.
pub fn run(domains: &[String], config: &PipelineConfig) -> Result<RunSummary> {
    let fetcher = Fetcher::new(&config.fetcher).context("Invalid fetcher configuration")?;
    let mut summary = RunSummary::default();

    for domain in domains {
        match run_domain(&fetcher, domain, config)? {
            DomainOutcome::Completed { stats, .. } => summary.record(&stats),
            DomainOutcome::Skipped { .. } => summary.record_skip(),
        }
    }

    info!(
        action = "summary",
        component = "pipeline",
        processed = summary.processed,
        skipped = summary.skipped,
        urls_written = summary.urls_written,
        "Run finished"
    );
    Ok(summary)
}
