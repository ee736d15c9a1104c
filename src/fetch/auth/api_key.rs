use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue, InvalidHeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header value is marked sensitive so it never shows up in debug output.
pub struct ApiKey<C> {
    pub inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: HeaderName, mut value: HeaderValue) -> Self {
        value.set_sensitive(true);
        Self {
            inner,
            header_name,
            value,
        }
    }

    /// Uses `Authorization: Bearer <token>`, the scheme issued by OAuth
    /// token endpoints.
    pub fn bearer(inner: C, token: &str) -> Result<Self, InvalidHeaderValue> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        Ok(Self::new(inner, AUTHORIZATION, value))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
