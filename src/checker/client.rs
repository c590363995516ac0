//! HTTP client for a LanguageTool-compatible `/v2/check` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{CheckError, CheckRequest, CheckResponse, TextChecker};

/// Checks text by POSTing form data to a LanguageTool server.
#[derive(Debug, Clone)]
pub struct LanguageToolClient {
    http: Client,
    url: String,
}

impl LanguageToolClient {
    /// Create a client for the given check endpoint URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CheckError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[tower_lsp::async_trait]
impl TextChecker for LanguageToolClient {
    async fn check(&self, request: CheckRequest) -> Result<CheckResponse, CheckError> {
        let fields = request.form_fields()?;
        let response = self.http.post(&self.url).form(&fields).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(url = %self.url, %status, "check request succeeded");
            Ok(response.json::<CheckResponse>().await?)
        } else {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(url = %self.url, error = %e, "could not read error body");
                    String::new()
                }
            };
            tracing::warn!(url = %self.url, %status, "check request failed");
            Err(CheckError::Service {
                status: status.as_u16(),
                message: service_message(status.as_u16(), &body),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract a user-facing message from an error response body.
///
/// The service prefixes messages with the exception type
/// (`"Error: Missing 'text' parameter"`); everything up to the first `:` is
/// dropped. Bodies may be JSON `{"message": ...}` or plain text.
pub fn service_message(status: u16, body: &str) -> String {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    };

    if message.is_empty() {
        return format!("unknown error (HTTP {status})");
    }

    match message.split_once(':') {
        Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => message,
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::checker::Payload;

    /// Serve one connection with `response` once the whole form has arrived.
    async fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !String::from_utf8_lossy(&received).contains("enabledOnly=") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response).await.unwrap();
        });
        format!("http://{addr}/v2/check")
    }

    fn request() -> CheckRequest {
        CheckRequest {
            language: "en-US".to_string(),
            payload: Payload::Text("Helo".to_string()),
            enabled_only: false,
        }
    }

    #[tokio::test]
    async fn truncated_error_body_reports_status() {
        // Announces more body than it sends, then hangs up.
        let url = serve_once(
            b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nError: cut",
        )
        .await;
        let client = LanguageToolClient::new(url, Duration::from_secs(5)).unwrap();

        match client.check(request()).await {
            Err(CheckError::Service { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "unknown error (HTTP 500)");
            }
            other => panic!("expected a service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_body_becomes_service_message() {
        let url = serve_once(
            b"HTTP/1.1 400 Bad Request\r\ncontent-length: 28\r\nconnection: close\r\n\r\nError: language 'xx' unknown",
        )
        .await;
        let client = LanguageToolClient::new(url, Duration::from_secs(5)).unwrap();

        match client.check(request()).await {
            Err(CheckError::Service { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "language 'xx' unknown");
            }
            other => panic!("expected a service error, got {other:?}"),
        }
    }

    #[test]
    fn strips_exception_prefix_from_json() {
        let body = r#"{"message": "java.lang.IllegalArgumentException: language code 'xx' unknown"}"#;
        assert_eq!(service_message(400, body), "language code 'xx' unknown");
    }

    #[test]
    fn strips_prefix_from_plain_text() {
        assert_eq!(
            service_message(400, "Error: Missing 'text' or 'data' parameter\n"),
            "Missing 'text' or 'data' parameter"
        );
    }

    #[test]
    fn message_without_prefix_is_kept() {
        assert_eq!(service_message(503, "Service busy"), "Service busy");
    }

    #[test]
    fn empty_body_reports_status() {
        assert_eq!(service_message(502, ""), "unknown error (HTTP 502)");
        assert_eq!(
            service_message(500, r#"{"message": ""}"#),
            "unknown error (HTTP 500)"
        );
    }

    #[test]
    fn client_keeps_url() {
        let client =
            LanguageToolClient::new("http://localhost:8081/v2/check", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.url(), "http://localhost:8081/v2/check");
    }
}
