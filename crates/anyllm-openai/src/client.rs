use anyllm_core::transport::FrameHandler;
use anyllm_core::{CancellationToken, Error, HttpTransport, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    transport: HttpTransport,
}

impl OpenAiClient {
    /// Create a client for the given base URL, attaching `Bearer` auth when
    /// an API key is supplied.
    pub fn new(base_url: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|err| Error::Transport(format!("invalid api key: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(Error::from)?;
        Ok(Self::with_http_client(http, base_url))
    }

    /// Use an externally configured HTTP client. Authentication headers are
    /// the client's responsibility in this case.
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::with_client(http, base_url),
        }
    }

    /// Create a chat completion and return the complete response.
    pub async fn chat_completion(
        &self,
        cancel: CancellationToken,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        request.stream = false;
        self.transport
            .post(cancel, "/v1/chat/completions", &request)
            .await
    }

    /// Create a streaming chat completion, handing the content of every
    /// delta to `on_delta` as it arrives.
    pub async fn chat_completion_stream(
        &self,
        cancel: CancellationToken,
        mut request: ChatCompletionRequest,
        on_delta: &mut FrameHandler<'_>,
    ) -> Result<()> {
        request.stream = true;
        let mut handle = |frame: &[u8]| {
            let chunk: ChatCompletionChunk = serde_json::from_slice(frame)
                .map_err(|err| Error::Transport(format!("decode stream chunk: {err}")))?;
            for choice in &chunk.choices {
                if let Some(reason) = choice.finish_reason.as_deref() {
                    debug!(reason, "completion finished");
                }
                if let Some(content) = choice.delta.content.as_deref() {
                    if !content.is_empty() {
                        on_delta(content.as_bytes())?;
                    }
                }
            }
            Ok(())
        };
        self.transport
            .stream(cancel, "/v1/chat/completions", &request, &mut handle)
            .await
    }
}

/// A single message in a chat-completion exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionMessage {
    pub role: String,
    pub content: String,
}

/// Request body for [`OpenAiClient::chat_completion`].
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    /// Conversation messages, oldest first.
    pub messages: Vec<ChatCompletionMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response body for [`OpenAiClient::chat_completion`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}
