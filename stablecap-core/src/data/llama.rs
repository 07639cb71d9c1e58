//! DefiLlama stablecoins API source.
//!
//! Three read-only endpoints, no authentication:
//! - `/stablecoins?includePrices=true` for the current snapshot
//! - `/stablecoin/{id}` for one asset's daily history
//! - `/stablecoincharts/all` for the aggregate daily total
//!
//! Requests are blocking and carry an explicit timeout. Connection failures,
//! timeouts, 429 and 5xx responses are retried a bounded number of times with
//! exponential backoff; any other failure is returned immediately.

use super::provider::{DataError, StablecoinSource};
use super::schema;
use crate::config::Config;
use crate::domain::{Asset, AssetHistory, TotalPoint};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://stablecoins.llama.fi";

/// Live DefiLlama source.
pub struct LlamaProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl LlamaProvider {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stablecap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, DataError> {
        Ok(Self::new(&config.base_url, config.timeout(), config.max_retries)?
            .with_backoff(config.retry_backoff()))
    }

    /// Delay before the first retry. Later retries double it.
    pub fn with_backoff(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn snapshot_url(&self) -> String {
        format!("{}/stablecoins?includePrices=true", self.base_url)
    }

    fn asset_history_url(&self, asset_id: &str) -> String {
        format!("{}/stablecoin/{asset_id}", self.base_url)
    }

    fn total_history_url(&self) -> String {
        format!("{}/stablecoincharts/all", self.base_url)
    }

    /// GET a URL and return the body, retrying transient failures.
    fn get_with_retry(&self, url: &str) -> Result<String, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt - 1));
                tracing::debug!(url, attempt, ?delay, "retrying request");
                std::thread::sleep(delay);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error()
                    {
                        last_error = Some(DataError::Network(format!("HTTP {status} for {url}")));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(DataError::Network(format!("HTTP {status} for {url}")));
                    }

                    return resp.text().map_err(|e| {
                        DataError::Network(format!("failed to read body from {url}: {e}"))
                    });
                }
                Err(e) => {
                    let err = DataError::Network(format!("{url}: {e}"));
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DataError::Network(format!("max retries exceeded for {url}"))))
    }
}

impl StablecoinSource for LlamaProvider {
    fn name(&self) -> &str {
        "defillama"
    }

    fn fetch_assets(&self) -> Result<Vec<Asset>, DataError> {
        let body = self.get_with_retry(&self.snapshot_url())?;
        schema::parse_snapshot(&body)
    }

    fn fetch_asset_history(&self, asset_id: &str) -> Result<AssetHistory, DataError> {
        let body = self.get_with_retry(&self.asset_history_url(asset_id))?;
        schema::parse_asset_history(&body)
    }

    fn fetch_total_history(&self) -> Result<Vec<TotalPoint>, DataError> {
        let body = self.get_with_retry(&self.total_history_url())?;
        schema::parse_total_history(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str) -> LlamaProvider {
        LlamaProvider::new(base, Duration::from_secs(5), 0).unwrap()
    }

    fn retrying_provider(base: &str, max_retries: u32) -> LlamaProvider {
        LlamaProvider::new(base, Duration::from_secs(5), max_retries)
            .unwrap()
            .with_backoff(Duration::from_millis(1))
    }

    const TOTALS_BODY: &str = r#"[{"date": "86400", "totalCirculating": {"peggedUSD": 5.0}}]"#;

    #[test]
    fn urls_are_built_from_base() {
        let p = provider(DEFAULT_BASE_URL);
        assert_eq!(
            p.snapshot_url(),
            "https://stablecoins.llama.fi/stablecoins?includePrices=true"
        );
        assert_eq!(
            p.asset_history_url("1"),
            "https://stablecoins.llama.fi/stablecoin/1"
        );
        assert_eq!(
            p.total_history_url(),
            "https://stablecoins.llama.fi/stablecoincharts/all"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let p = provider("http://localhost:8080/");
        assert_eq!(p.total_history_url(), "http://localhost:8080/stablecoincharts/all");
    }

    #[test]
    fn unreachable_host_is_network_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let p = provider("http://127.0.0.1:9");
        let err = p.fetch_assets().unwrap_err();
        assert!(matches!(err, DataError::Network(_)), "got {err:?}");
    }

    #[test]
    fn server_error_is_retried_then_succeeds() {
        let mut server = mockito::Server::new();
        let unavailable = server
            .mock("GET", "/stablecoincharts/all")
            .with_status(503)
            .expect(1)
            .create();
        let ok = server
            .mock("GET", "/stablecoincharts/all")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TOTALS_BODY)
            .expect(1)
            .create();

        let points = retrying_provider(&server.url(), 2)
            .fetch_total_history()
            .unwrap();

        assert_eq!(points, vec![TotalPoint { date: 86_400, total: 5.0 }]);
        unavailable.assert();
        ok.assert();
    }

    #[test]
    fn rate_limit_is_retried() {
        let mut server = mockito::Server::new();
        let limited = server
            .mock("GET", "/stablecoincharts/all")
            .with_status(429)
            .expect(1)
            .create();
        let ok = server
            .mock("GET", "/stablecoincharts/all")
            .with_status(200)
            .with_body(TOTALS_BODY)
            .expect(1)
            .create();

        assert!(retrying_provider(&server.url(), 1).fetch_total_history().is_ok());
        limited.assert();
        ok.assert();
    }

    #[test]
    fn client_error_fails_without_retry() {
        let mut server = mockito::Server::new();
        let not_found = server
            .mock("GET", "/stablecoin/999")
            .with_status(404)
            .expect(1)
            .create();

        let err = retrying_provider(&server.url(), 3)
            .fetch_asset_history("999")
            .unwrap_err();

        assert!(matches!(err, DataError::Network(ref msg) if msg.contains("404")), "got {err:?}");
        not_found.assert();
    }

    #[test]
    fn persistent_server_error_stops_after_max_retries() {
        let mut server = mockito::Server::new();
        let unavailable = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/stablecoins(\?.*)?$".to_string()),
            )
            .with_status(503)
            .expect(3)
            .create();

        let err = retrying_provider(&server.url(), 2).fetch_assets().unwrap_err();

        assert!(matches!(err, DataError::Network(ref msg) if msg.contains("503")), "got {err:?}");
        unavailable.assert();
    }
}
