use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SinkError};
use crate::prompt::{Message, Prompt};

/// Callback receiving streamed chunks in arrival order. Delivery of the next
/// chunk never begins before the previous invocation returns, and the sink
/// is never invoked concurrently with itself for the same call.
pub type ChunkSink<'a> = dyn FnMut(&[u8]) -> std::result::Result<(), SinkError> + Send + 'a;

/// A chat-capable backend adapter.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the prompt and return the completion text.
    async fn call(&self, cancel: CancellationToken, prompt: Prompt) -> Result<String>;

    /// Send the prompt, handing every content delta to `sink` as it arrives.
    /// A sink error stops the stream immediately and is returned as
    /// [`Error::Sink`](crate::Error::Sink).
    async fn stream(
        &self,
        cancel: CancellationToken,
        prompt: Prompt,
        sink: &mut ChunkSink<'_>,
    ) -> Result<()>;
}

/// Front end over a configured [`ChatModel`].
pub struct Chat {
    model: Box<dyn ChatModel>,
}

impl Chat {
    pub fn new(model: impl ChatModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// Send a single user message and return the reply.
    pub async fn chat(&self, cancel: CancellationToken, content: &str) -> Result<String> {
        self.prompt(cancel, Prompt::new([Message::user(content)]))
            .await
    }

    /// Send a single user message, streaming the reply into `sink`.
    pub async fn chat_stream(
        &self,
        cancel: CancellationToken,
        content: &str,
        sink: &mut ChunkSink<'_>,
    ) -> Result<()> {
        self.stream(cancel, Prompt::new([Message::user(content)]), sink)
            .await
    }

    pub async fn prompt(&self, cancel: CancellationToken, prompt: Prompt) -> Result<String> {
        self.model.call(cancel, prompt).await
    }

    pub async fn stream(
        &self,
        cancel: CancellationToken,
        prompt: Prompt,
        sink: &mut ChunkSink<'_>,
    ) -> Result<()> {
        self.model.stream(cancel, prompt, sink).await
    }
}
