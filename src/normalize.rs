use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Static-asset extensions excluded unless the caller supplies its own list.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".pdf", ".svg", ".json", ".css", ".js", ".webp", ".woff",
    ".woff2", ".eot", ".ttf", ".otf", ".mp4", ".txt",
];

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("failed to parse URL {url:?}: {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL {url:?} has no scheme")]
    MissingScheme { url: String },
}

/// Set of lowercase, dot-prefixed file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        )
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.0.contains(extension)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }

    let ext = ext.to_ascii_lowercase();
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{}", ext))
    }
}

/// A URL split into its components exactly as written, apart from a
/// redundant default port removed from the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    scheme: String,
    authority: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl CanonicalUrl {
    /// Validates `raw` with the WHATWG parser, then splits the original text.
    ///
    /// Only `http:80` and `https:443` are rewritten; host case, dot segments,
    /// escapes and separators stay as they were, so the result re-parses to
    /// itself.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let raw = raw.trim();
        Url::parse(raw).map_err(|source| UrlError::Parse {
            url: raw.to_string(),
            source,
        })?;

        let (scheme, rest) = raw.split_once(':').ok_or_else(|| UrlError::MissingScheme {
            url: raw.to_string(),
        })?;

        let (authority, rest) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after
                    .find(|c| matches!(c, '/' | '\\' | '?' | '#'))
                    .unwrap_or(after.len());
                (
                    Some(strip_default_port(scheme, &after[..end])),
                    &after[end..],
                )
            }
            None => (None, rest),
        };

        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (rest, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        Ok(Self {
            scheme: scheme.to_string(),
            authority,
            path: path.to_string(),
            query,
            fragment,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Scheme, authority and path; query and fragment dropped.
    pub fn endpoint(&self) -> Self {
        Self {
            query: None,
            fragment: None,
            ..self.clone()
        }
    }

    pub fn with_query(&self, query: Option<String>) -> Self {
        Self {
            query,
            ..self.clone()
        }
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(authority) = &self.authority {
            write!(f, "//{}", authority)?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

fn strip_default_port(scheme: &str, authority: &str) -> String {
    let default_port = match scheme.to_ascii_lowercase().as_str() {
        "http" => 80,
        "https" => 443,
        _ => return authority.to_string(),
    };

    match authority.rsplit_once(':') {
        Some((host, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && port.parse::<u32>() == Ok(default_port) =>
        {
            host.to_string()
        }
        _ => authority.to_string(),
    }
}

pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, UrlError> {
    CanonicalUrl::parse(raw)
}

pub fn canonical_form(raw: &str) -> Result<String, UrlError> {
    canonicalize(raw).map(|url| url.to_string())
}

/// Lowercase extension of the final path segment, including the dot.
///
/// Segment parameters after `;` are not part of the name, and leading dots do
/// not start an extension, so `/.htaccess` has none while
/// `/logo.PNG;jsessionid=1` yields `.png`.
pub fn path_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let segment = segment.split(';').next().unwrap_or(segment);
    let name = segment.trim_start_matches('.');
    name.rfind('.').map(|idx| name[idx..].to_ascii_lowercase())
}

pub fn is_excluded(url: &CanonicalUrl, extensions: &ExtensionSet) -> bool {
    path_extension(url.path())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false)
}
