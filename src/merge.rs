use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{info, warn};

use crate::normalize::CanonicalUrl;
use crate::query::{self, QueryParams};

/// How the merged URL binds values to each discovered parameter name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// One value per name, the smallest of the values seen for it.
    #[default]
    Representative,
    /// Every value seen for a name, emitted as repeated `name=value` pairs.
    AllValues,
}

#[derive(Debug)]
struct EndpointParams {
    endpoint: CanonicalUrl,
    params: IndexMap<String, BTreeSet<String>>,
}

/// Collapses cleaned URLs into one URL per endpoint carrying the union of
/// parameter names seen for it.
///
/// The output is sorted by endpoint and contains each endpoint exactly once.
pub fn merge<I, S>(cleaned: I, strategy: MergeStrategy) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start_time = Instant::now();
    let mut groups: BTreeMap<String, EndpointParams> = BTreeMap::new();

    for raw in cleaned {
        let raw = raw.as_ref();
        let url = match CanonicalUrl::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(action = "parse", component = "merger", url = raw, error = %e, "Skipping unparsable cleaned URL");
                continue;
            }
        };

        let endpoint = url.endpoint();
        let group = groups
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointParams {
                endpoint,
                params: IndexMap::new(),
            });

        for (name, values) in query::parse_query(url.query().unwrap_or_default()) {
            group.params.entry(name).or_default().extend(values);
        }
    }

    let merged: Vec<String> = groups
        .into_values()
        .map(|group| render(group, strategy))
        .collect();

    info!(
        action = "complete",
        component = "merger",
        endpoints = merged.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Parameter merge completed"
    );
    merged
}

fn render(group: EndpointParams, strategy: MergeStrategy) -> String {
    let params: QueryParams = group
        .params
        .into_iter()
        .map(|(name, values)| {
            let values: Vec<String> = match strategy {
                MergeStrategy::Representative => values.into_iter().take(1).collect(),
                MergeStrategy::AllValues => values.into_iter().collect(),
            };
            (name, values)
        })
        .collect();

    query::with_params(&group.endpoint, &params).to_string()
}
