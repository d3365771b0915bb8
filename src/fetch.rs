use reqwest::blocking::Client;
use reqwest::Proxy;
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Linear backoff: the wait after failed attempt `n` is
/// `initial_wait + (n - 1) * wait_step` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts before giving up.
    pub max_retries: u32,
    pub initial_wait: u32,
    pub wait_step: u32,
    /// Length of one wait unit.
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_wait: 10,
            wait_step: 5,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait in units after the given 1-based failed attempt.
    pub fn wait_units(&self, attempt: u32) -> u32 {
        self.initial_wait
            .saturating_add(self.wait_step.saturating_mul(attempt.saturating_sub(1)))
    }

    pub fn wait_for(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(self.wait_units(attempt))
    }

    /// Accumulated wait when every attempt fails.
    pub fn total_wait(&self) -> Duration {
        (1..=self.max_retries).map(|attempt| self.wait_for(attempt)).sum()
    }
}

/// Runs `attempt_fn` until it succeeds or `policy.max_retries` attempts fail.
///
/// Every failure is followed by a `sleep` for the policy's wait, the last one
/// included; a success returns immediately.
pub fn fetch_with_retry<T, E, F, S>(
    url: &str,
    policy: &RetryPolicy,
    mut sleep: S,
    mut attempt_fn: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, E>,
    E: Display,
    S: FnMut(Duration),
{
    let mut last_error = String::from("no attempt was made");

    for attempt in 1..=policy.max_retries {
        match attempt_fn(attempt) {
            Ok(value) => {
                debug!(action = "fetch", component = "fetcher", url, attempt, "Request succeeded");
                return Ok(value);
            }
            Err(e) => {
                let wait = policy.wait_for(attempt);
                warn!(
                    action = "retry",
                    component = "fetcher",
                    url,
                    attempt,
                    max_retries = policy.max_retries,
                    wait_secs = wait.as_secs_f64(),
                    error = %e,
                    "Request failed, waiting before next attempt"
                );
                last_error = e.to_string();
                sleep(wait);
            }
        }
    }

    error!(
        action = "exhausted",
        component = "fetcher",
        url,
        attempts = policy.max_retries,
        "Giving up after all retries failed"
    );
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts: policy.max_retries,
        last_error,
    })
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub proxy: Option<String>,
    /// Transport timeout for a single request.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Blocking HTTP GET with retries, optionally routed through a proxy.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(concat!("paramspider/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy).map_err(FetchError::Client)?);
        }

        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    /// Returns the response body of the first successful attempt.
    pub fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_with_retry(url, &self.retry, std::thread::sleep, |_| self.get(url))
    }

    fn get(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client.get(url).send()?.error_for_status()?.text()
    }
}
