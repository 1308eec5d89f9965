//! HTTP port used by the gateway, and its reqwest adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use snafu::ResultExt as _;
use tracing::debug;
use url::Url;

use crate::error::{
    BoxedError, DecodeSnafu, HttpClientSnafu, HttpSnafu, InitResult, StatusSnafu, TransportResult,
};

const LOG_TARGET: &str = "wpgate::transport";

/// Header carrying the total result count on self-hosted listings.
pub const TOTAL_HEADER: &str = "X-WP-Total";

pub const DEFAULT_USER_AGENT: &str = concat!("wpgate/", env!("CARGO_PKG_VERSION"));

/// A response from the upstream, with the body already parsed.
///
/// Bodies of non-success responses are not parsed and come back as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub total: Option<u64>,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            total: None,
            body,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            total: None,
            body: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn ensure_success(self, url: &Url) -> TransportResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            StatusSnafu {
                url: url.as_str(),
                status: self.status,
            }
            .fail()
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> TransportResult<UpstreamResponse>;

    async fn post_json(&self, url: &Url, body: &Value) -> TransportResult<UpstreamResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> InitResult<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context(HttpClientSnafu)?;

        Ok(Self { client })
    }

    async fn read(url: &Url, resp: reqwest::Response) -> TransportResult<UpstreamResponse> {
        let status = resp.status().as_u16();
        let total = resp
            .headers()
            .get(TOTAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let text = resp
            .text()
            .await
            .map_err(BoxedError::from)
            .context(HttpSnafu { url: url.as_str() })?;

        let body = if (200..300).contains(&status) {
            serde_json::from_str(&text).context(DecodeSnafu { url: url.as_str() })?
        } else {
            debug!(target: LOG_TARGET, %url, status, body = %text, "Upstream error response");
            Value::Null
        };

        Ok(UpstreamResponse {
            status,
            total,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> TransportResult<UpstreamResponse> {
        debug!(target: LOG_TARGET, %url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(BoxedError::from)
            .context(HttpSnafu { url: url.as_str() })?;

        Self::read(url, resp).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> TransportResult<UpstreamResponse> {
        debug!(target: LOG_TARGET, %url, "POST");
        let resp = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(BoxedError::from)
            .context(HttpSnafu { url: url.as_str() })?;

        Self::read(url, resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_success() {
        let url = Url::parse("https://news.example/wp-json/wp/v2/posts").unwrap();
        assert!(UpstreamResponse::ok(Value::Null).ensure_success(&url).is_ok());

        let err = UpstreamResponse::status(404)
            .ensure_success(&url)
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
