use anyhow::{Context, Result};
use indexmap::IndexSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Normalizes one domain entry: scheme prefix and trailing slashes removed,
/// lowercased. Returns `None` for blank entries.
pub fn normalize_domain(entry: &str) -> Option<String> {
    let entry = entry.trim().to_lowercase();
    let entry = entry
        .strip_prefix("https://")
        .or_else(|| entry.strip_prefix("http://"))
        .unwrap_or(&entry)
        .trim_end_matches('/');

    if entry.is_empty() {
        None
    } else {
        Some(entry.to_string())
    }
}

/// Parses a newline-delimited domain list, dropping blanks and duplicates
/// while keeping first-seen order.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(normalize_domain)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

pub fn load_domain_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Error reading domain list file {:?}", path))?;
    let domains = parse_domain_list(&content);

    info!(action = "loaded", component = "domain_list", domain_count = domains.len(), file_path = ?path, "Loaded domains from file");
    Ok(domains)
}

/// Resolves the run's target domains from exactly one of a single domain or
/// a domain-list file.
///
/// The CLI's argument group already rejects neither/both; library callers
/// get the same check here.
pub fn resolve_targets(domain: Option<&str>, list: Option<&Path>) -> Result<Vec<String>> {
    match (domain, list) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Please provide either the -d option or the -l option, not both")
        }
        (None, None) => anyhow::bail!("Please provide either the -d option or the -l option"),
        (Some(domain), None) => match normalize_domain(domain) {
            Some(domain) => Ok(vec![domain]),
            None => anyhow::bail!("Domain must not be empty"),
        },
        (None, Some(path)) => load_domain_list(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("Example.COM").as_deref(), Some("example.com"));
        assert_eq!(
            normalize_domain("https://example.com/").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            normalize_domain("HTTP://sub.example.com").as_deref(),
            Some("sub.example.com")
        );
        assert_eq!(normalize_domain("   "), None);
    }

    #[test]
    fn test_parse_domain_list_dedupes_and_strips() {
        let domains = parse_domain_list("https://b.com\n\nA.com\nhttp://a.com\nb.com\n");
        assert_eq!(domains, vec!["b.com", "a.com"]);
    }

    #[test]
    fn test_load_domain_list_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "example.com\nhttps://example.org").unwrap();

        let domains = load_domain_list(file.path()).unwrap();
        assert_eq!(domains, vec!["example.com", "example.org"]);
    }

    #[test]
    fn test_missing_domain_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_domain_list(&dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("Error reading domain list file"));
    }

    #[test]
    fn test_resolve_targets_requires_exactly_one() {
        assert!(resolve_targets(None, None).is_err());
        assert!(resolve_targets(Some("a.com"), Some(Path::new("list.txt"))).is_err());
        assert_eq!(resolve_targets(Some("A.com"), None).unwrap(), vec!["a.com"]);
    }
}
