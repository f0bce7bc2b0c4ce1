//! The seam between the engine and whatever performs HTTP requests.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

/// Query parameter carrying the access credential.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Fetches JSON documents for the engine.
///
/// Implementations return the parsed body whenever one is available, including
/// on non-success statuses: the remote API reports failures as an `error`
/// object inside the body and the engine translates those itself.
#[async_trait]
pub trait GraphTransport: Send + Sync + std::fmt::Debug {
    /// Perform one GET request and parse the body.
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError>;
}

/// Render a URL for logs with the access token masked.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == ACCESS_TOKEN_PARAM {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    if pairs.is_empty() {
        return redacted.to_string();
    }
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_masks_only_the_token() {
        let url = Url::parse("https://graph.example.com/1/friends?access_token=secret&limit=25")
            .unwrap();
        let shown = redact_url(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("access_token=***") || shown.contains("access_token=%2A%2A%2A"));
        assert!(shown.contains("limit=25"));
    }

    #[test]
    fn redact_leaves_plain_urls_alone() {
        let url = Url::parse("https://graph.example.com/1").unwrap();
        assert_eq!(redact_url(&url), "https://graph.example.com/1");
    }
}
