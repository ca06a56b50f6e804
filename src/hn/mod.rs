//! Hacker News client.
//!
//! Story ids come from one of the feed endpoints; each story is then fetched
//! individually in fixed-size batches, with the fetches of one batch running
//! concurrently.
//!
//! ```text
//! load_stories(feed, limit)
//!     ├── GET {base}/{feed}stories.json   ← failure aborts the load
//!     └── for each batch of 10 ids
//!             └── GET {base}/item/{id}.json (concurrent)  ← failures dropped
//! ```

mod client;
mod types;

pub use client::HnClient;
pub use types::{Item, StoryFeed};

use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HnError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetches and decodes JSON documents.
pub trait Transport: Send + Sync {
    fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<T, HnError>> + Send;
}

/// [`Transport`] over a shared `reqwest::Client`, using its default timeouts.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &str) -> Result<T, HnError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(HnError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
