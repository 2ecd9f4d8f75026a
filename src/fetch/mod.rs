//! Feed retrieval.
//!
//! [`fetch_bytes`] performs one GET through any [`HttpClient`]; [`FeedSource`]
//! is what the scheduler polls, implemented for an HTTP endpoint
//! ([`FeedClient`]) and a saved payload on disk ([`FileSource`]).

mod basic;
mod client;
pub mod auth;
mod source;

pub use auth::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;
pub use source::{FeedClient, FeedSource, FileSource};

use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use crate::error::{Error, Result};

/// Issues a single GET for `url` and returns the whole body.
///
/// Any non-2xx status fails the fetch; the body of a failed response is
/// never handed to the decoder. No retry is attempted here.
#[tracing::instrument(skip_all, fields(url = %url))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &Url) -> Result<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status {
            status,
            url: url.to_string(),
        });
    }

    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "Feed bytes received");
    Ok(bytes)
}
