//! HTTP tool endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use super::{ToolError, ToolInvoker};
use crate::error::{OrionError, Result};
use crate::models::ToolParams;

/// Default tool gateway.
pub const DEFAULT_TOOL_BASE_URL: &str = "http://mcp.localhost";

/// Invokes tools with `POST <base>/tools/<name>` and a JSON parameter body.
#[derive(Debug, Clone)]
pub struct HttpToolInvoker {
    client: Client,
    base_url: String,
}

impl HttpToolInvoker {
    /// Creates an invoker whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `OrionError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrionError::configuration(format!("Failed to build tool client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates an invoker around an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// URL a tool is posted to.
    pub fn endpoint(&self, tool: &str) -> String {
        format!("{}/tools/{}", self.base_url, tool)
    }
}

#[async_trait]
impl ToolInvoker for HttpToolInvoker {
    async fn invoke(&self, tool: &str, params: &ToolParams) -> std::result::Result<Value, ToolError> {
        let url = self.endpoint(tool);
        debug!("Invoking tool {tool} at {url}");

        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| {
                warn!("Tool {tool} unreachable: {e}");
                ToolError::new(tool, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Tool {tool} returned HTTP {status}");
            return Err(ToolError::new(tool, format!("tool endpoint returned HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ToolError::new(tool, format!("failed to read response: {e}")))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body)
            .map_err(|e| ToolError::new(tool, format!("invalid JSON response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn invoker(server: &MockServer) -> HttpToolInvoker {
        HttpToolInvoker::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let invoker =
            HttpToolInvoker::new("http://mcp.localhost/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            invoker.endpoint("inbox.triage"),
            "http://mcp.localhost/tools/inbox.triage"
        );
    }

    #[tokio::test]
    async fn test_invoke_posts_params_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tools/ops.report.daily"))
            .and(body_json(json!({ "date": "2025-01-31" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "decisions": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut params = ToolParams::new();
        params.insert("date".into(), json!("2025-01-31"));
        let result = invoker(&server)
            .invoke("ops.report.daily", &params)
            .await
            .unwrap();
        assert_eq!(result, json!({ "decisions": [] }));
    }

    #[tokio::test]
    async fn test_invoke_maps_non_success_to_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = invoker(&server)
            .invoke("leads.queue", &ToolParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.tool, "leads.queue");
        assert!(err.message.contains("503"), "{}", err.message);
    }

    #[tokio::test]
    async fn test_invoke_maps_invalid_json_to_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = invoker(&server)
            .invoke("vector.refresh", &ToolParams::new())
            .await
            .unwrap_err();
        assert!(err.message.contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_invoke_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let result = invoker(&server)
            .invoke("vector.refresh", &ToolParams::new())
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_invoke_times_out_as_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let invoker = HttpToolInvoker::new(server.uri(), Duration::from_millis(50)).unwrap();
        let err = invoker
            .invoke("inbox.triage", &ToolParams::new())
            .await
            .unwrap_err();
        assert!(err.message.contains("request failed"));
    }

    #[tokio::test]
    async fn test_invoke_unreachable_host() {
        let invoker = HttpToolInvoker::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = invoker
            .invoke("inbox.triage", &ToolParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.tool, "inbox.triage");
    }
}
