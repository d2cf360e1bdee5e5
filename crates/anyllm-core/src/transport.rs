use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};

/// Initial capacity of the frame buffer. A single frame larger than this
/// grows the buffer; frames are never truncated.
const FRAME_BUFFER_CAPACITY: usize = 512 * 1000;

/// Receives each streamed frame that passed the transport-level checks.
pub type FrameHandler<'a> = dyn FnMut(&[u8]) -> Result<()> + Send + 'a;

/// Shared HTTP transport: one `reqwest::Client` plus a base endpoint,
/// created once per provider client and safe for concurrent calls. Requests
/// hold no cross-call state.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use an externally configured client (timeouts, TLS, proxies).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request<B>(&self, path: &str, body: &B) -> Result<reqwest::RequestBuilder>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        Ok(self
            .http
            .post(self.endpoint(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, user_agent())
            .body(payload))
    }

    /// One non-streaming request. Status < 400 decodes the body into `T`;
    /// otherwise the body is decoded as an error envelope and surfaced as a
    /// provider error that keeps the HTTP status.
    pub async fn post<B, T>(&self, cancel: CancellationToken, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(path, body)?;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = request.send() => response?,
        };
        let status = response.status();
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            bytes = response.bytes() => bytes?,
        };
        if status.is_client_error() || status.is_server_error() {
            return Err(status_error(status, &bytes));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| Error::Transport(format!("decode response: {err}")))
    }

    /// One streaming request. The response body is consumed as
    /// newline-delimited frames; every frame that passes the checks in
    /// [`deliver`] is handed to `handler` before the next network read, so
    /// handler completion gates further reads. The body is released on every
    /// exit path when the stream is dropped.
    pub async fn stream<B>(
        &self,
        cancel: CancellationToken,
        path: &str,
        body: &B,
        handler: &mut FrameHandler<'_>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(path, body)?;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = request.send() => response?,
        };
        let status = response.status();
        debug!(%status, path, "streaming response opened");
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::with_capacity(FRAME_BUFFER_CAPACITY);
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            buffer.extend_from_slice(&chunk?);
            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let frame: Vec<u8> = buffer.drain(..=pos).collect();
                match deliver(status, &frame, handler)? {
                    Delivered::Frame => {}
                    Delivered::End => return Ok(()),
                }
            }
        }
        // The final frame is valid without a trailing newline.
        if !buffer.is_empty() {
            deliver(status, &buffer, handler)?;
        }
        Ok(())
    }
}

enum Delivered {
    Frame,
    End,
}

/// Per-frame error precedence: a non-empty in-band `error` field wins over
/// the HTTP status; an error status wins over frame content; only then is
/// the frame forwarded.
fn deliver(status: StatusCode, frame: &[u8], handler: &mut FrameHandler<'_>) -> Result<Delivered> {
    let Some(frame) = normalize_frame(frame) else {
        return Ok(Delivered::Frame);
    };
    if frame == b"[DONE]" {
        return Ok(Delivered::End);
    }
    let envelope: ErrorEnvelope = serde_json::from_slice(frame)
        .map_err(|err| Error::Transport(format!("decode frame: {err}")))?;
    if let Some(message) = envelope.message() {
        return Err(Error::Provider {
            status: None,
            message: message.to_owned(),
        });
    }
    if status.is_client_error() || status.is_server_error() {
        return Err(Error::Provider {
            status: Some(status),
            message: format!("HTTP status {status}"),
        });
    }
    handler(frame)?;
    Ok(Delivered::Frame)
}

/// Strip line endings and the SSE `data:` marker used by OpenAI-compatible
/// backends. Ollama frames are bare JSON and pass through unchanged. Returns
/// `None` for blank lines.
fn normalize_frame(frame: &[u8]) -> Option<&[u8]> {
    let frame = frame.trim_ascii();
    let frame = match frame.strip_prefix(b"data:") {
        Some(rest) => rest.trim_ascii_start(),
        None => frame,
    };
    if frame.is_empty() {
        None
    } else {
        Some(frame)
    }
}

fn user_agent() -> String {
    format!(
        "anyllm/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn status_error(status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => Error::Provider {
            status: Some(status),
            message: format!("{status}: {}", envelope.message().unwrap_or_default()),
        },
        Err(err) => Error::Transport(format!("HTTP {status}: {err}")),
    }
}

/// Generic error envelope shared by both backends: Ollama reports
/// `{"error": "..."}`, OpenAI-compatible servers `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detail { message: String },
}

impl ErrorEnvelope {
    fn message(&self) -> Option<&str> {
        match &self.error {
            Some(ErrorField::Text(text)) if !text.is_empty() => Some(text),
            Some(ErrorField::Detail { message }) if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        value: String,
    }

    #[test]
    fn normalize_strips_line_endings_and_sse_marker() {
        assert_eq!(normalize_frame(b"{\"a\":1}\r\n"), Some(&b"{\"a\":1}"[..]));
        assert_eq!(normalize_frame(b"data: {\"a\":1}\n"), Some(&b"{\"a\":1}"[..]));
        assert_eq!(normalize_frame(b"data: [DONE]\n"), Some(&b"[DONE]"[..]));
        assert_eq!(normalize_frame(b"\r\n"), None);
        assert_eq!(normalize_frame(b""), None);
    }

    #[test]
    fn envelope_reads_both_error_shapes() {
        let text: ErrorEnvelope = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(text.message(), Some("boom"));

        let detail: ErrorEnvelope =
            serde_json::from_str(r#"{"error":{"message":"boom","type":"server_error"}}"#).unwrap();
        assert_eq!(detail.message(), Some("boom"));

        let empty: ErrorEnvelope = serde_json::from_str(r#"{"error":""}"#).unwrap();
        assert_eq!(empty.message(), None);

        let none: ErrorEnvelope = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(none.message(), None);
    }

    #[tokio::test]
    async fn post_decodes_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ping"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"value":"pong"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        let pong: Pong = transport
            .post(CancellationToken::new(), "/api/ping", &serde_json::json!({}))
            .await
            .expect("post");
        assert_eq!(pong.value, "pong");
    }

    #[tokio::test]
    async fn post_surfaces_error_body_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(404).set_body_raw(
                r#"{"error":"model not found"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        let err = transport
            .post::<_, Pong>(CancellationToken::new(), "/api/ping", &serde_json::json!({}))
            .await
            .expect_err("post should fail");
        match err {
            Error::Provider { status, message } => {
                assert_eq!(status, Some(StatusCode::NOT_FOUND));
                assert!(message.contains("404"), "{message}");
                assert!(message.contains("model not found"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_keeps_status_when_error_body_is_undecodable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(500).set_body_string("gateway blew up"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri());
        let err = transport
            .post::<_, Pong>(CancellationToken::new(), "/api/ping", &serde_json::json!({}))
            .await
            .expect_err("post should fail");
        match err {
            Error::Transport(message) => {
                assert!(message.contains("500"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let transport = HttpTransport::new(server.uri());
        let err = transport
            .post::<_, Pong>(cancel, "/api/ping", &serde_json::json!({}))
            .await
            .expect_err("post should be cancelled");
        assert!(matches!(err, Error::Cancelled));
    }
}
