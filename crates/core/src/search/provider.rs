use crate::config::Settings;
use crate::error::ProxyError;
use crate::search::TickerSearch;
use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://ticker-2e1ica8b9.now.sh";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpTickerSearch {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpTickerSearch {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .ticker_search_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);

        let timeout_secs = std::env::var("TICKER_SEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid ticker search base url: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "ticker search base url cannot carry a path: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build ticker search http client")?;

        Ok(Self { http, base_url })
    }

    /// `{base_url}/keyword/{keyword}` with the keyword encoded as a single segment.
    fn url(&self, keyword: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("keyword").push(keyword);
        }
        url
    }
}

#[async_trait::async_trait]
impl TickerSearch for HttpTickerSearch {
    fn provider_name(&self) -> &'static str {
        "ticker_keyword_http"
    }

    async fn search(&self, keyword: &str) -> Result<Value, ProxyError> {
        let url = self.url(keyword);
        tracing::debug!(%url, "ticker search request");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| ProxyError::UpstreamUnavailable(e.to_string()))?;

        res.json::<Value>()
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(e.to_string()))
    }
}
