//! HTTP request tool

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Response bodies longer than this are truncated
const MAX_BODY_LENGTH: usize = 30_000;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tool description
const DESCRIPTION: &str = r#"Makes an HTTP request and returns the response.

Usage:
- method defaults to GET
- headers is an object of header names to values
- body is sent as-is; set a Content-Type header when sending JSON
- Response bodies over 30000 characters are truncated"#;

/// Parameters for the http_request tool
#[derive(Debug, Deserialize)]
pub struct HttpRequestParams {
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// HTTP request tool implementation
pub struct HttpRequestTool {
    client: reqwest::Client,
}

impl HttpRequestTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpRequestTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HttpRequestTool {
    fn id(&self) -> &'static str {
        "http_request"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "method": {
                    "type": "string",
                    "description": "HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD)"
                },
                "url": {
                    "type": "string",
                    "description": "The URL to request"
                },
                "headers": {
                    "type": "object",
                    "additionalProperties": { "type": "string" },
                    "description": "Request headers"
                },
                "body": {
                    "type": "string",
                    "description": "Request body"
                },
                "timeout": {
                    "type": "number",
                    "description": "Timeout in seconds (default 30)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let params: HttpRequestParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("http_request", e.to_string()))?;

        let method = Method::from_bytes(params.method.to_uppercase().as_bytes()).map_err(|_| {
            AgentError::invalid_arguments("http_request", format!("Invalid method: {}", params.method))
        })?;

        if !(params.url.starts_with("http://") || params.url.starts_with("https://")) {
            return Err(AgentError::invalid_arguments(
                "http_request",
                "url must start with http:// or https://",
            ));
        }

        let mut request = self
            .client
            .request(method.clone(), &params.url)
            .timeout(Duration::from_secs(
                params.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ));
        for (name, value) in &params.headers {
            request = request.header(name, value);
        }
        if let Some(body) = params.body {
            request = request.body(body);
        }

        tracing::debug!(%method, url = %params.url, "Sending HTTP request");

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::tool_execution("http_request", e.to_string()))?;

        let status = response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();
        let mut body = response
            .text()
            .await
            .map_err(|e| AgentError::tool_execution("http_request", e.to_string()))?;

        let truncated = body.len() > MAX_BODY_LENGTH;
        if truncated {
            let mut cut = MAX_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push_str("\n... (body truncated)");
        }

        let header_text: String = headers
            .iter()
            .map(|(k, v)| format!("{k}: {v}\n"))
            .collect();

        Ok(ToolResult {
            title: format!("{} {}", method, params.url),
            output: format!("Status: {}\n{}\n{}", status, header_text, body),
            metadata: json!({
                "status": status.as_u16(),
                "headers": headers,
                "truncated": truncated,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_get_request() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());

        let result = HttpRequestTool::new()
            .execute(json!({ "url": url }), &ctx)
            .await
            .unwrap();

        assert_eq!(result.metadata["status"], 200);
        assert!(result.output.starts_with("Status: 200 OK"));
        assert!(result.output.ends_with("hello"));
    }

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());

        let err = HttpRequestTool::new()
            .execute(json!({ "url": "file:///etc/passwd" }), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidArguments { .. }));
    }
}
