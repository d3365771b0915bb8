use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::normalize::{self, CanonicalUrl, ExtensionSet};

/// Parameter name to observed values, names kept in order of first appearance.
pub type QueryParams = IndexMap<String, Vec<String>>;

/// Result of cleaning one domain's raw archive tokens.
///
/// `urls` is a `BTreeSet`, so iteration is sorted by the full URL string and
/// stable across runs. Input order is not preserved.
#[derive(Debug, Default)]
pub struct CleanedUrls {
    pub urls: BTreeSet<String>,
    pub malformed: usize,
    pub excluded: usize,
}

/// Decodes a query string into grouped parameters.
///
/// Pairs with an empty value (`a=` or a bare `a`) carry no value to record
/// and are dropped.
pub fn parse_query(query: &str) -> QueryParams {
    let mut params = QueryParams::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Replaces every value with `placeholder`, keeping how often each name occurs.
pub fn apply_placeholder(params: &mut QueryParams, placeholder: &str) {
    for values in params.values_mut() {
        for value in values.iter_mut() {
            *value = placeholder.to_string();
        }
    }
}

pub fn encode_query(params: &QueryParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, values) in params {
        for value in values {
            serializer.append_pair(name, value);
        }
    }
    serializer.finish()
}

/// Rebuilds `url` with `params` as its query; an empty set removes the `?`.
pub fn with_params(url: &CanonicalUrl, params: &QueryParams) -> CanonicalUrl {
    if params.is_empty() {
        url.with_query(None)
    } else {
        url.with_query(Some(encode_query(params)))
    }
}

/// Canonicalizes one URL and rebuilds its query.
///
/// Returns `None` when the path carries an excluded extension.
pub fn clean_url(
    url: &CanonicalUrl,
    extensions: &ExtensionSet,
    placeholder: Option<&str>,
) -> Option<String> {
    if normalize::is_excluded(url, extensions) {
        return None;
    }

    let mut params = parse_query(url.query().unwrap_or_default());
    if let Some(placeholder) = placeholder {
        apply_placeholder(&mut params, placeholder);
    }

    Some(with_params(url, &params).to_string())
}

/// Filters, canonicalizes and deduplicates raw archive tokens.
///
/// Tokens that do not parse as URLs are skipped with a warning so a single
/// bad line cannot abort the domain.
pub fn process<I, S>(
    urls: I,
    extensions: &ExtensionSet,
    placeholder: Option<&str>,
) -> CleanedUrls
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start_time = Instant::now();
    let mut result = CleanedUrls::default();

    for raw in urls {
        let raw = raw.as_ref();
        let url = match normalize::canonicalize(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(action = "parse", component = "query_canonicalizer", token = raw, error = %e, "Skipping malformed URL");
                result.malformed += 1;
                continue;
            }
        };

        match clean_url(&url, extensions, placeholder) {
            Some(cleaned) => {
                result.urls.insert(cleaned);
            }
            None => {
                debug!(action = "exclude", component = "query_canonicalizer", url = %url, "Excluded by extension");
                result.excluded += 1;
            }
        }
    }

    info!(
        action = "complete",
        component = "query_canonicalizer",
        cleaned = result.urls.len(),
        excluded = result.excluded,
        malformed = result.malformed,
        duration_ms = start_time.elapsed().as_millis(),
        "URL cleaning completed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str, placeholder: Option<&str>) -> Option<String> {
        let url = normalize::canonicalize(raw).unwrap();
        clean_url(&url, &ExtensionSet::default(), placeholder)
    }

    #[test]
    fn test_parse_query_groups_repeated_names() {
        let params = parse_query("a=1&b=3&a=2");
        assert_eq!(params.len(), 2);
        assert_eq!(params["a"], vec!["1", "2"]);
        assert_eq!(params["b"], vec!["3"]);
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_query_drops_blank_values() {
        let params = parse_query("debug&empty=&id=7");
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_parse_query_decodes_values() {
        let params = parse_query("q=hello+world&path=%2Fetc");
        assert_eq!(params["q"], vec!["hello world"]);
        assert_eq!(params["path"], vec!["/etc"]);
    }

    #[test]
    fn test_placeholder_preserves_value_count() {
        assert_eq!(
            clean("https://h/ep?a=1&a=2&b=3", Some("FUZZ")).unwrap(),
            "https://h/ep?a=FUZZ&a=FUZZ&b=FUZZ"
        );
    }

    #[test]
    fn test_no_placeholder_keeps_values() {
        assert_eq!(
            clean("https://h/ep?a=1&b=3&a=2", None).unwrap(),
            "https://h/ep?a=1&a=2&b=3"
        );
    }

    #[test]
    fn test_query_without_values_is_removed() {
        assert_eq!(clean("https://h/ep?", None).unwrap(), "https://h/ep");
        assert_eq!(clean("https://h/ep?flag", None).unwrap(), "https://h/ep");
    }

    #[test]
    fn test_path_is_kept_as_written() {
        assert_eq!(
            clean("http://Example.COM:80/A/../b?x=1", None).unwrap(),
            "http://Example.COM/A/../b?x=1"
        );
    }

    #[test]
    fn test_process_keeps_trailing_slash_variants_apart() {
        let result = process(
            ["http://example.com", "http://example.com/"],
            &ExtensionSet::default(),
            None,
        );
        assert_eq!(result.urls.len(), 2);
        assert!(result.urls.contains("http://example.com"));
        assert!(result.urls.contains("http://example.com/"));
    }

    #[test]
    fn test_excluded_url_is_dropped() {
        assert_eq!(clean("https://h/logo.png?x=1", None), None);
        assert_eq!(clean("https://h/logo.png;jsessionid=ABC", None), None);
    }

    #[test]
    fn test_process_deduplicates_identical_urls() {
        let result = process(
            [
                "https://h/ep?x=1",
                "https://h/ep?x=1",
                "https://h:443/ep?x=1",
            ],
            &ExtensionSet::default(),
            None,
        );
        assert_eq!(result.urls.len(), 1);
        assert!(result.urls.contains("https://h/ep?x=1"));
    }

    #[test]
    fn test_process_placeholder_collapses_distinct_values() {
        let result = process(
            ["https://h/ep?x=1", "https://h/ep?x=2"],
            &ExtensionSet::default(),
            Some("FUZZ"),
        );
        assert_eq!(result.urls.len(), 1);
        assert!(result.urls.contains("https://h/ep?x=FUZZ"));
    }

    #[test]
    fn test_process_counts_skipped_tokens() {
        let result = process(
            [
                "http://example.com/a?x=1",
                "::not-a-url::",
                "http://example.com/style.css",
                "http://example.com/font.WOFF2?v=3",
            ],
            &ExtensionSet::default(),
            None,
        );
        assert_eq!(result.urls.len(), 1);
        assert_eq!(result.malformed, 1);
        assert_eq!(result.excluded, 2);
    }
}
