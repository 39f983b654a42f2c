//! Blocking Overpass interpreter client.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::query::OverpassQuery;
use super::types::OverpassResponse;
use crate::config::OverpassConfig;

/// Overpass request failures. None of these are retried.
#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("{0}")]
    Network(String),
    #[error("rate limited by the Overpass API (HTTP 429 Too Many Requests)")]
    RateLimited,
    #[error("HTTP {code} {text}")]
    Status { code: u16, text: String },
    #[error("invalid Overpass response: {0}")]
    InvalidResponse(String),
}

/// Something that can run an Overpass query and return its elements.
pub trait Transport {
    fn execute(&self, query: &OverpassQuery) -> Result<OverpassResponse, OverpassError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, query: &OverpassQuery) -> Result<OverpassResponse, OverpassError> {
        (**self).execute(query)
    }
}

/// HTTP transport: `POST <endpoint>` with a form body `data=<query>`.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    endpoint: String,
    user_agent: String,
    grace: Duration,
}

impl OverpassClient {
    pub fn new(config: &OverpassConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
            grace: Duration::from_secs(config.http_grace_secs),
        }
    }
}

impl Transport for OverpassClient {
    fn execute(&self, query: &OverpassQuery) -> Result<OverpassResponse, OverpassError> {
        debug!(endpoint = %self.endpoint, query = %query, "overpass request");

        let response = ureq::post(&self.endpoint)
            .set("User-Agent", &self.user_agent)
            .timeout(query.timeout() + self.grace)
            .send_form(&[("data", query.as_str())])
            .map_err(|e| {
                let err = map_ureq_error(e);
                warn!(error = %err, "overpass request failed");
                err
            })?;

        let body: serde_json::Value = response
            .into_json()
            .map_err(|e| OverpassError::InvalidResponse(e.to_string()))?;
        let body = decode_response(body).map_err(|err| {
            warn!(error = %err, "overpass query failed server-side");
            err
        })?;

        debug!(elements = body.elements.len(), "overpass response");
        Ok(body)
    }
}

/// Check the envelope of an HTTP 200 body.
///
/// A runtime failure reported in `remark` (query timeout, out of memory) is a
/// network-class error even when `elements` is present and empty.
pub(crate) fn decode_response(body: serde_json::Value) -> Result<OverpassResponse, OverpassError> {
    if let Some(remark) = body.get("remark").and_then(|r| r.as_str()) {
        if OverpassResponse::is_runtime_failure(remark) {
            return Err(OverpassError::Network(remark.trim().to_string()));
        }
    }
    serde_json::from_value(body).map_err(|e| OverpassError::InvalidResponse(e.to_string()))
}

fn map_ureq_error(e: ureq::Error) -> OverpassError {
    match e {
        ureq::Error::Status(code, resp) => status_error(code, resp.status_text()),
        ureq::Error::Transport(t) => OverpassError::Network(t.to_string()),
    }
}

fn status_error(code: u16, text: &str) -> OverpassError {
    match code {
        429 => OverpassError::RateLimited,
        _ => OverpassError::Status {
            code,
            text: text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            OverpassError::Status { code: 504, text: "Gateway Timeout".into() }.to_string(),
            "HTTP 504 Gateway Timeout"
        );
        assert!(OverpassError::RateLimited.to_string().contains("429"));
        assert_eq!(OverpassError::Network("timed out".into()).to_string(), "timed out");
    }

    #[test]
    fn test_status_codes() {
        assert!(matches!(status_error(429, "Too Many Requests"), OverpassError::RateLimited));
        match status_error(504, "Gateway Timeout") {
            OverpassError::Status { code, text } => {
                assert_eq!(code, 504);
                assert_eq!(text, "Gateway Timeout");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_plain_envelope() {
        let body = decode_response(json!({
            "elements": [{"type": "node", "id": 1, "tags": {"name": "A"}}],
            "remark": "note: results truncated for display"
        }))
        .unwrap();
        assert_eq!(body.elements.len(), 1);
    }

    #[test]
    fn test_decode_timeout_remark_is_network_error() {
        let err = decode_response(json!({
            "elements": [],
            "remark": "runtime error: Query timed out in \"query\" at line 1 after 91 seconds."
        }))
        .unwrap_err();
        match err {
            OverpassError::Network(msg) => assert!(msg.starts_with("runtime error: Query timed out")),
            other => panic!("expected network error, got {:?}", other),
        }

        let err = decode_response(json!({"remark": "runtime error: Query run out of memory"})).unwrap_err();
        assert!(matches!(err, OverpassError::Network(_)));
    }

    #[test]
    fn test_decode_without_elements_is_invalid() {
        let err = decode_response(json!({"version": 0.6})).unwrap_err();
        assert!(matches!(err, OverpassError::InvalidResponse(_)));
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        let config = OverpassConfig {
            endpoint: "http://127.0.0.1:1/api/interpreter".into(),
            http_grace_secs: 1,
            ..OverpassConfig::default()
        };
        let client = OverpassClient::new(&config);
        let err = client.execute(&OverpassQuery::named_feature("x", 1)).unwrap_err();
        assert!(matches!(err, OverpassError::Network(_)));
    }
}
