use anyllm_core::{CancellationToken, ChunkSink, Error, HttpTransport, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Client for an Ollama HTTP API. Cheap to clone; all clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    transport: HttpTransport,
}

impl OllamaClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::new(base_url),
        }
    }

    /// Use an externally configured HTTP client.
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::with_client(http, base_url),
        }
    }

    /// Send a chat conversation and return the complete response.
    pub async fn chat(
        &self,
        cancel: CancellationToken,
        mut request: ChatRequest,
    ) -> Result<ChatResponse> {
        request.stream = false;
        self.transport.post(cancel, "/api/chat", &request).await
    }

    /// Send a chat conversation, handing each response frame's bytes to
    /// `sink` as it arrives.
    pub async fn chat_stream(
        &self,
        cancel: CancellationToken,
        mut request: ChatRequest,
        sink: &mut ChunkSink<'_>,
    ) -> Result<()> {
        request.stream = true;
        debug!(model = %request.model, "opening chat stream");
        let mut forward = |frame: &[u8]| sink(frame).map_err(Error::Sink);
        self.transport
            .stream(cancel, "/api/chat", &request, &mut forward)
            .await
    }

    /// Generate embeddings for a batch of inputs in one call.
    pub async fn embed(
        &self,
        cancel: CancellationToken,
        request: EmbedRequest,
    ) -> Result<EmbedResponse> {
        self.transport.post(cancel, "/api/embed", &request).await
    }

    /// Generate an embedding for a single prompt via the legacy endpoint.
    pub async fn embeddings(
        &self,
        cancel: CancellationToken,
        request: EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse> {
        self.transport
            .post(cancel, "/api/embeddings", &request)
            .await
    }
}

/// A single message in a chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for [`OllamaClient::chat`] and [`OllamaClient::chat_stream`].
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    /// Conversation messages, oldest first.
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    /// Model-specific options, passed through as-is.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

/// Response body for [`OllamaClient::chat`]; streaming calls deliver one of
/// these per frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Request body for [`OllamaClient::embed`].
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    pub model: String,
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

/// Response body for [`OllamaClient::embed`]. Vectors are in input order.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub model: String,
    pub embeddings: Vec<Vec<f32>>,
}

/// Request body for the legacy [`OllamaClient::embeddings`] endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub prompt: String,
}

/// Response body for the legacy [`OllamaClient::embeddings`] endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponse {
    pub embedding: Vec<f64>,
}
