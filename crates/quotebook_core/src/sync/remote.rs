//! Remote quote source contract and HTTP implementation.
//!
//! # Responsibility
//! - Fetch the remote post list and map `title -> text`, `body -> category`.
//! - Send newly added local quotes as posts.
//!
//! # Invariants
//! - One request per call: no retry, no backoff.
//! - No request timeout unless one is configured.
//! - POST responses are logged only; they never feed back into local state.

use crate::model::quote::QuoteRecord;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// `userId` sent with every outgoing post.
pub const DEFAULT_USER_ID: u32 = 1;

/// Network failure while talking to the remote endpoint.
#[derive(Debug)]
pub enum NetworkError {
    /// Connection, TLS, timeout or client construction failure.
    Transport(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Status { status: u16, url: String },
    /// The response body was not the expected JSON shape.
    Decode(serde_json::Error),
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::Status { status, url } => write!(f, "`{url}` answered with status {status}"),
            Self::Decode(err) => write!(f, "unexpected response body: {err}"),
        }
    }
}

impl Error for NetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Status { .. } => None,
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// One item of the remote list. Extra fields (`id`, `userId`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemotePost {
    pub title: String,
    pub body: String,
}

impl From<RemotePost> for QuoteRecord {
    fn from(value: RemotePost) -> Self {
        QuoteRecord::new(value.title, value.body)
    }
}

/// Body of an outgoing post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRemotePost<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub user_id: u32,
}

impl<'a> From<&'a QuoteRecord> for NewRemotePost<'a> {
    fn from(value: &'a QuoteRecord) -> Self {
        Self {
            title: value.text.as_str(),
            body: value.category.as_str(),
            user_id: DEFAULT_USER_ID,
        }
    }
}

/// Remote endpoint contract used by the reconciler.
pub trait RemoteSource: Send + Sync {
    /// Retrieves the remote list mapped to quote records.
    fn fetch_remote(&self) -> Result<Vec<QuoteRecord>, NetworkError>;
    /// Sends one newly added local record.
    fn post_local(&self, quote: &QuoteRecord) -> Result<(), NetworkError>;
}

/// Blocking HTTP implementation of `RemoteSource`.
pub struct HttpRemoteSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpRemoteSource {
    /// Builds a client for `endpoint`.
    ///
    /// `timeout = None` disables the client's default request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn ensure_success(&self, response: &reqwest::blocking::Response) -> Result<(), NetworkError> {
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }
        Ok(())
    }
}

impl RemoteSource for HttpRemoteSource {
    fn fetch_remote(&self) -> Result<Vec<QuoteRecord>, NetworkError> {
        debug!("event=remote_fetch module=sync status=start url={}", self.endpoint);
        let response = self.client.get(&self.endpoint).send()?;
        self.ensure_success(&response)?;

        let text = response.text()?;
        let quotes = decode_remote_posts(&text)?;
        info!(
            "event=remote_fetch module=sync status=ok count={}",
            quotes.len()
        );
        Ok(quotes)
    }

    fn post_local(&self, quote: &QuoteRecord) -> Result<(), NetworkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json; charset=UTF-8")
            .json(&NewRemotePost::from(quote))
            .send()?;
        self.ensure_success(&response)?;

        let body = response.text()?;
        info!("event=remote_post module=sync status=ok response={body}");
        Ok(())
    }
}

/// Decodes a remote list body into quote records.
pub fn decode_remote_posts(body: &str) -> Result<Vec<QuoteRecord>, NetworkError> {
    let posts: Vec<RemotePost> = serde_json::from_str(body).map_err(NetworkError::Decode)?;
    Ok(posts.into_iter().map(QuoteRecord::from).collect())
}
