mod chat;
mod client;

pub use chat::OpenAiChatModel;
pub use client::{
    ChatCompletionChoice, ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse,
    OpenAiClient,
};

/// Model used by [`OpenAiChatModel`] when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
