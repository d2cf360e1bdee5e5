pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod prompt;
pub mod transport;

pub use chat::{Chat, ChatModel, ChunkSink};
pub use config::{Config, ConfigError, ModelConfig};
pub use embedding::{Embedder, Embedding, EmbeddingModel, EmbeddingRequest, EmbeddingResponse};
pub use error::{Error, Result, SinkError};
pub use prompt::{CallOptions, Message, Prompt, Role};
pub use transport::{FrameHandler, HttpTransport};

pub use tokio_util::sync::CancellationToken;
