//! Page rendering and document fetching.
//!
//! The pipeline only talks to the [`Fetcher`] trait, so the network side can
//! be swapped for a headless browser, a recorded corpus or a test stub. The
//! bundled [`HttpFetcher`] retrieves pages over HTTP(S) and serves `file://`
//! URLs from disk, which makes local site mirrors usable as input.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{NgoscopeError, Result};

/// The DOM of a page as it was rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct DomSnapshot {
    /// Final URL after redirects.
    pub url: Url,
    pub html: String,
}

/// Source of rendered pages and raw linked documents.
///
/// Implementations must be safe to share between concurrently running
/// extractions and are expected to apply their own politeness policy.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Render `url` and return its DOM snapshot.
    ///
    /// `wait_for_js` asks the implementation to let client-side scripts run
    /// before the snapshot is taken. Implementations that cannot execute
    /// scripts return the served markup.
    async fn render(&self, url: &Url, wait_for_js: bool, timeout: Duration) -> Result<DomSnapshot>;

    /// Fetch the raw bytes of a linked document such as a PDF.
    async fn fetch_document(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>>;
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound on one request in seconds, applied on top of per-call timeouts.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Minimum spacing between two requests to the same host.
    pub min_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; ngoscope/0.3; +https://github.com/stormlightlabs/ngoscope)"
                .to_string(),
            min_delay: Duration::from_secs(1),
        }
    }
}

/// Convert a local path into a `file://` URL.
pub fn local_url<P: AsRef<Path>>(path: P) -> Result<Url> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(NgoscopeError::FileNotFound(path.to_path_buf()));
    }
    let absolute = path.canonicalize()?;
    Url::from_file_path(&absolute).map_err(|_| NgoscopeError::InvalidUrl(absolute.display().to_string()))
}

pub(crate) async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| NgoscopeError::Timeout { timeout: timeout.as_secs() })?
}

async fn read_local(url: &Url) -> Result<Vec<u8>> {
    let path = url
        .to_file_path()
        .map_err(|_| NgoscopeError::InvalidUrl(format!("{} is not a local path", url)))?;

    if !path.exists() {
        return Err(NgoscopeError::FileNotFound(path));
    }

    tokio::fs::read(&path).await.map_err(|e| NgoscopeError::FetchError { url: url.to_string(), reason: e.to_string() })
}

#[cfg(feature = "fetch")]
pub use http::HttpFetcher;

#[cfg(feature = "fetch")]
mod http {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use tokio::sync::Mutex;
    use tokio::time::Instant;
    use url::Url;

    use super::{DomSnapshot, FetchConfig, Fetcher, read_local, with_timeout};
    use crate::{NgoscopeError, Result};

    /// Fetcher backed by a shared reqwest client.
    ///
    /// Requests to one host are spaced by [`FetchConfig::min_delay`]. Scripts
    /// are not executed, so pages that build their content client-side come
    /// back as served.
    pub struct HttpFetcher {
        client: Client,
        config: FetchConfig,
        next_slot: Mutex<HashMap<String, Instant>>,
    }

    impl HttpFetcher {
        pub fn new(config: FetchConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(NgoscopeError::HttpError)?;

            Ok(Self { client, config, next_slot: Mutex::new(HashMap::new()) })
        }

        /// Wait until this host may be contacted again and reserve the next slot.
        async fn pace(&self, url: &Url) {
            let Some(host) = url.host_str().map(str::to_lowercase) else {
                return;
            };

            let slot = {
                let mut slots = self.next_slot.lock().await;
                let now = Instant::now();
                let slot = slots.get(&host).copied().filter(|s| *s > now).unwrap_or(now);
                slots.insert(host, slot + self.config.min_delay);
                slot
            };

            tokio::time::sleep_until(slot).await;
        }

        async fn get(&self, url: &Url, accept: &str) -> Result<reqwest::Response> {
            self.pace(url).await;

            let response = self
                .client
                .get(url.clone())
                .header("Accept", accept)
                .header("Accept-Language", "en-US,en;q=0.9")
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        NgoscopeError::Timeout { timeout: self.config.timeout }
                    } else {
                        NgoscopeError::HttpError(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(NgoscopeError::FetchError { url: url.to_string(), reason: format!("HTTP {}", status) });
            }

            Ok(response)
        }
    }

    #[async_trait]
    impl Fetcher for HttpFetcher {
        async fn render(&self, url: &Url, wait_for_js: bool, timeout: Duration) -> Result<DomSnapshot> {
            if wait_for_js {
                tracing::debug!(%url, "script execution unavailable, using served markup");
            }

            with_timeout(timeout, async {
                if url.scheme() == "file" {
                    let bytes = read_local(url).await?;
                    return Ok(DomSnapshot { url: url.clone(), html: String::from_utf8_lossy(&bytes).into_owned() });
                }

                let response = self
                    .get(url, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
                    .await?;
                let final_url = response.url().clone();
                let html = response.text().await?;
                Ok(DomSnapshot { url: final_url, html })
            })
            .await
        }

        async fn fetch_document(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>> {
            with_timeout(timeout, async {
                if url.scheme() == "file" {
                    return read_local(url).await;
                }

                let response = self.get(url, "application/pdf,*/*;q=0.8").await?;
                Ok(response.bytes().await?.to_vec())
            })
            .await
        }
    }

}
