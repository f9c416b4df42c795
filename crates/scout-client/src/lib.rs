//! HTTP client for the research agent.
//!
//! One operation: `GET <endpoint>?query=<percent-encoded query>`, followed by
//! status checking and normalization of the JSON body into an
//! [`AgentResponse`]. No retries and no caching.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use scout_protocol::{AgentResponse, Query, ResearchError, DEFAULT_ENDPOINT, QUERY_PARAM};

/// Longest slice of an error body kept in debug logs.
const MAX_LOGGED_BODY: usize = 512;

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid agent endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Configuration for the agent client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the research route, without the query string.
    pub endpoint: String,
    /// Upper bound on a single request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: None,
        }
    }
}

/// Client for the research agent. Cheap to clone; clones share a connection pool.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl AgentClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let endpoint = parse_endpoint(&config.endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// The exact URL requested for `query`.
    pub fn request_url(&self, query: &Query) -> String {
        let base = self.endpoint.as_str();
        let sep = if self.endpoint.query().is_some() { '&' } else { '?' };
        format!("{base}{sep}{QUERY_PARAM}={}", query.encoded())
    }

    /// Ask the agent about `query`.
    pub async fn research(&self, query: &Query) -> Result<AgentResponse, ResearchError> {
        let url = self.request_url(query);
        tracing::debug!(url = %url, "Sending research request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Research request failed");
                ResearchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_error_body(status.as_u16(), &body);
            return Err(ResearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResearchError::Decode(e.to_string()))?;

        let normalized = AgentResponse::from_json(&body);
        match &normalized {
            Ok(resp) => tracing::info!(
                topic = %resp.topic,
                sources = resp.sources.len(),
                "Research response received"
            ),
            Err(e) => tracing::warn!(error = %e, "Research response rejected"),
        }
        normalized
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let url = Url::parse(endpoint).map_err(|e| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    let reason = match url.scheme() {
        "http" | "https" if url.fragment().is_some() => "fragments are not allowed".to_string(),
        "http" | "https" => return Ok(url),
        other => format!("unsupported scheme '{other}'"),
    };
    Err(ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    })
}

/// The agent reports failures as `{"error": ..., "detail": ...}`.
fn log_error_body(status: u16, body: &str) {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) if value.get("error").is_some() => {
            tracing::debug!(
                status,
                error = %value["error"],
                detail = %value.get("detail").cloned().unwrap_or_default(),
                "Agent returned error status"
            );
        }
        _ => {
            let end = body
                .char_indices()
                .nth(MAX_LOGGED_BODY)
                .map(|(i, _)| i)
                .unwrap_or(body.len());
            tracing::debug!(status, body = &body[..end], "Agent returned error status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> AgentClient {
        AgentClient::new(ClientConfig {
            endpoint: endpoint.to_string(),
            request_timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn default_endpoint_is_local_agent() {
        let c = AgentClient::new(ClientConfig::default()).unwrap();
        assert_eq!(c.endpoint(), "http://localhost:5001/research");
    }

    #[test]
    fn request_url_percent_encodes_query() {
        let c = client("http://localhost:5001/research");
        let q = Query::parse("  What is the capital of Tunisia?  ").unwrap();
        assert_eq!(
            c.request_url(&q),
            "http://localhost:5001/research?query=What%20is%20the%20capital%20of%20Tunisia%3F"
        );
    }

    #[test]
    fn request_url_appends_to_existing_query_string() {
        let c = client("http://agent.local/research?lang=en");
        let q = Query::parse("rust").unwrap();
        assert_eq!(c.request_url(&q), "http://agent.local/research?lang=en&query=rust");
    }

    #[test]
    fn invalid_endpoints_are_rejected() {
        for endpoint in [
            "not a url",
            "ftp://agent.local/research",
            "",
            "http://agent.local/research#x",
            "http://agent.local/research#",
        ] {
            let err = AgentClient::new(ClientConfig {
                endpoint: endpoint.to_string(),
                request_timeout: None,
            })
            .unwrap_err();
            assert!(matches!(err, ClientError::InvalidEndpoint { .. }), "{endpoint}");
        }
    }
}
