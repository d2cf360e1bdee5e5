mod chat;
mod client;
mod embedding;

pub use chat::OllamaChatModel;
pub use client::{
    ChatMessage, ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, EmbeddingsRequest,
    EmbeddingsResponse, OllamaClient,
};
pub use embedding::OllamaEmbeddingModel;

/// Model used by [`OllamaChatModel`] when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "llama3";

/// Model used by [`OllamaEmbeddingModel`] when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
