//! Quote of the moment, fetched from a remote JSON endpoint.
//!
//! `QuoteFeed` keeps the latest status for the UI. A refresh aborts the request in
//! flight; a superseded request never writes its result or clears `loading`.

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Shown to the user when a fetch fails. Details go to the log only.
pub const QUOTE_ERROR_MESSAGE: &str = "Could not load quote";

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quote API returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub author: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Source trait
// ────────────────────────────────────────────────────────────────────────────

/// Where quotes come from. `AppState` carries the feed built on an `Arc<dyn QuoteSource>`.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_random(&self) -> Result<Quote, QuoteError>;
}

/// reqwest-backed source for a `GET → {"quote": ..., "author": ...}` endpoint.
#[derive(Clone)]
pub struct HttpQuoteClient {
    client: Client,
    url: String,
}

impl HttpQuoteClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteClient {
    async fn fetch_random(&self) -> Result<Quote, QuoteError> {
        let response = self
            .client
            .get(&self.url)
            .header("cache-control", "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let quote: Quote = response.json().await?;
        debug!(chars = quote.quote.len(), "quote fetched");
        Ok(quote)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Feed
// ────────────────────────────────────────────────────────────────────────────

/// What the UI shows. Empty `quote` = none loaded yet; empty `error` = no error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteStatus {
    pub quote: String,
    pub author: Option<String>,
    pub loading: bool,
    pub error: String,
}

impl Default for QuoteStatus {
    fn default() -> Self {
        Self {
            quote: String::new(),
            author: None,
            loading: true,
            error: String::new(),
        }
    }
}

struct FeedInner {
    status: QuoteStatus,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct QuoteFeed {
    source: Arc<dyn QuoteSource>,
    inner: Arc<Mutex<FeedInner>>,
}

impl QuoteFeed {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            inner: Arc::new(Mutex::new(FeedInner {
                status: QuoteStatus::default(),
                generation: 0,
                in_flight: None,
            })),
        }
    }

    pub async fn status(&self) -> QuoteStatus {
        self.inner.lock().await.status.clone()
    }

    /// Starts a new fetch, cancelling any fetch still in flight.
    pub async fn refresh(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.in_flight.take() {
            previous.abort();
            debug!("aborted in-flight quote request");
        }

        inner.generation += 1;
        let generation = inner.generation;
        inner.status.loading = true;
        inner.status.error.clear();

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.inner);
        // The lock is held until the handle is stored, so the task cannot finish first.
        inner.in_flight = Some(tokio::spawn(async move {
            let outcome = source.fetch_random().await;

            let mut inner = shared.lock().await;
            if inner.generation != generation {
                return;
            }
            match outcome {
                Ok(quote) => {
                    inner.status.quote = quote.quote;
                    inner.status.author = quote.author;
                }
                Err(e) => {
                    warn!("quote fetch failed: {e}");
                    inner.status.error = QUOTE_ERROR_MESSAGE.to_string();
                }
            }
            inner.status.loading = false;
            inner.in_flight = None;
        }));
    }

    #[cfg(test)]
    pub(crate) async fn wait_idle(&self) {
        let handle = self.inner.lock().await.in_flight.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
