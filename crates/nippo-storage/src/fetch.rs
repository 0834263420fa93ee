//! Best-effort image fetching.
//!
//! Non-200 responses and transport errors both resolve to absence; callers
//! treat a missing image as a degraded render input, never a failure.

use async_trait::async_trait;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(url, error = %e, "image fetch failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(url, status = %resp.status(), "image fetch returned non-success");
            return None;
        }

        match resp.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!(url, error = %e, "image body read failed");
                None
            }
        }
    }
}
