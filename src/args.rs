use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::normalize::default_extensions;

#[derive(Parser, Debug)]
#[command(
    name = "paramspider",
    about = "Mine parameterized URLs for a domain from web archive history",
    version,
    long_about = None
)]
#[command(group(ArgGroup::new("target").required(true).args(["domain", "list"])))]
pub struct Args {
    /// Domain name to fetch related URLs for
    #[arg(short, long)]
    pub domain: Option<String>,

    /// File containing a list of domain names, one per line
    #[arg(short, long)]
    pub list: Option<PathBuf>,

    /// Stream URLs on the terminal
    #[arg(short, long)]
    pub stream: bool,

    /// Proxy address for web requests
    #[arg(long)]
    pub proxy: Option<String>,

    /// Placeholder for parameter values; original values are kept when omitted
    #[arg(short, long)]
    pub placeholder: Option<String>,

    /// File extensions to exclude
    #[arg(short, long, num_args = 1.., default_values_t = default_extensions())]
    pub extensions: Vec<String>,

    /// Output file; defaults to <domain>.txt for each domain
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of fetch attempts per domain
    #[arg(long, default_value_t = 5)]
    pub retries: u32,

    /// Length of one backoff unit in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub retry_unit_ms: u64,

    /// Transport timeout per request in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Keep every observed value per parameter when merging
    #[arg(long)]
    pub keep_values: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_single_domain_with_defaults() {
        let args = Args::try_parse_from(["paramspider", "-d", "example.com"]).unwrap();
        assert_eq!(args.domain.as_deref(), Some("example.com"));
        assert_eq!(args.extensions, default_extensions());
        assert_eq!(args.retries, 5);
        assert!(!args.stream);
    }

    #[test]
    fn test_domain_and_list_are_exclusive() {
        let result = Args::try_parse_from(["paramspider", "-d", "a.com", "-l", "domains.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_target_is_required() {
        assert!(Args::try_parse_from(["paramspider", "-s"]).is_err());
    }

    #[test]
    fn test_extensions_accept_multiple_values() {
        let args =
            Args::try_parse_from(["paramspider", "-l", "d.txt", "-e", ".php", ".asp", "-s"])
                .unwrap();
        assert_eq!(args.extensions, vec![".php", ".asp"]);
        assert!(args.stream);
    }
}
