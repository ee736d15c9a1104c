mod basic;
mod client;
pub mod auth;
pub mod retry;
#[cfg(test)]
pub(crate) mod fake;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use retry::{RetryPolicy, with_retry};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Network trouble, rate limiting and server errors are worth retrying.
    /// Client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            FetchError::InvalidUrl(_) | FetchError::Decode(_) => false,
        }
    }

    /// The catalog does not know the requested entity (or rejected its id).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FetchError::Status { status, .. }
                if *status == StatusCode::NOT_FOUND || *status == StatusCode::BAD_REQUEST
        )
    }
}

/// Issues a GET request and decodes the JSON body.
///
/// Non-2xx responses are returned as [`FetchError::Status`] with the body
/// text attached.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(
    client: &C,
    url: &str,
) -> Result<T, FetchError> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()
            .map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
