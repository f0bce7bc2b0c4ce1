//! reqwest-backed [`GraphTransport`].

use async_trait::async_trait;
use fbg_core::{
    GraphError, GraphResult, GraphTransport, HttpErrorInfo, ServerError, TransportError, redact_url,
};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::GraphConfig;

const MAX_ERROR_BODY: usize = 512;

/// Performs GET requests with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &GraphConfig) -> GraphResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| GraphError::Config(format!("cannot build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn http_error_info(err: &reqwest::Error) -> HttpErrorInfo {
    HttpErrorInfo {
        message: err.to_string(),
        status_code: err.status().map(|status| status.as_u16()),
        is_timeout: err.is_timeout(),
        is_connect: err.is_connect(),
    }
}

fn truncate(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_ERROR_BODY {
        return text.into_owned();
    }
    let mut end = MAX_ERROR_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[async_trait]
impl GraphTransport for HttpTransport {
    /// A failure status keeps its body only when the body carries an `error`
    /// object; those are interpreted upstream. Any other failure becomes
    /// [`TransportError::Status`].
    #[instrument(skip(self, url), fields(url = %redact_url(url)))]
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        let response = self.client.get(url.clone()).send().await.map_err(|err| {
            let info = http_error_info(&err);
            warn!(timeout = info.is_timeout, connect = info.is_connect, "request failed");
            TransportError::Http(info)
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::Http(http_error_info(&err)))?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "response received");

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) if status.is_success() || ServerError::detect(&body).is_some() => Ok(body),
            Err(err) if status.is_success() => Err(err.into()),
            _ => {
                warn!(status = status.as_u16(), "request failed without an error object");
                Err(TransportError::Status {
                    status: status.as_u16(),
                    body: truncate(&bytes),
                })
            }
        }
    }
}
