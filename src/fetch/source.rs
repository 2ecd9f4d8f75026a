use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use super::{ApiKey, BasicClient, HttpClient, fetch_bytes};
use crate::config::{API_KEY_HEADER, FeedConfig};
use crate::error::Result;

/// Produces one raw feed payload per call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Bytes>;
}

/// A fixed HTTP endpoint fetched through `C`.
pub struct FeedClient<C> {
    client: C,
    url: Url,
}

impl<C: HttpClient> FeedClient<C> {
    pub fn new(client: C, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FeedClient<ApiKey<BasicClient>> {
    /// Builds the standard client: timeouts from `config` and the credential
    /// in the `x-api-key` header (empty when no key is configured).
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let basic = BasicClient::new(config.timeout)?;
        let key = config.api_key.as_deref().unwrap_or_default();
        let client = ApiKey::new(basic, API_KEY_HEADER, key)?;
        Ok(Self::new(client, config.url.clone()))
    }
}

#[async_trait]
impl<C: HttpClient> FeedSource for FeedClient<C> {
    async fn fetch(&self) -> Result<Bytes> {
        fetch_bytes(&self.client, &self.url).await
    }
}

/// A payload saved to disk, re-read on every fetch.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileSource {
    async fn fetch(&self) -> Result<Bytes> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(Bytes::from(bytes))
    }
}
