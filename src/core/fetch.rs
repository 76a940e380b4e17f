//! Blocking HTTP fetch used by the numeric-ID download screen.
//!
//! The menu loop is synchronous, so [`HttpFetcher`] keeps its own
//! current-thread tokio runtime and blocks on each request.

use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::runtime::{Builder, Runtime};

/// Result of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Body(String),
    /// Request completed but returned nothing.
    Empty,
    /// Transport failure (connect, timeout, TLS, ...).
    Failed(String),
}

impl FetchOutcome {
    /// Text shown to the user: the project title when the body is JSON
    /// carrying one, otherwise the trimmed body, or a sentinel.
    pub fn display(&self) -> String {
        match self {
            FetchOutcome::Body(body) => {
                let text = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("title").and_then(|t| t.as_str()).map(str::to_string))
                    .unwrap_or_else(|| body.to_string());
                match text.trim() {
                    "" => "BLANK".to_string(),
                    shown => shown.to_string(),
                }
            }
            FetchOutcome::Empty => "BLANK".to_string(),
            FetchOutcome::Failed(_) => "ERROR".to_string(),
        }
    }

    /// Outcome for a completed request's body.  Whitespace counts as empty.
    pub fn from_body(body: String) -> Self {
        if body.trim().is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Body(body)
        }
    }
}

pub trait Fetcher {
    fn fetch(&self, url: &str) -> FetchOutcome;
}

pub struct HttpFetcher {
    runtime: Runtime,
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start fetch runtime")?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { runtime, client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        tracing::info!(%url, "fetching");
        let result = self.runtime.block_on(async {
            let response = self.client.get(url).send().await?;
            tracing::debug!(status = %response.status(), "fetch response");
            response.text().await
        });
        match result {
            Ok(body) => FetchOutcome::from_body(body),
            Err(e) => {
                tracing::warn!(%url, error = %e, "fetch failed");
                FetchOutcome::Failed(e.to_string())
            }
        }
    }
}
