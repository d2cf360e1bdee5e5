use anyllm_core::{CancellationToken, ChatModel, ChunkSink, Prompt, Result};
use async_trait::async_trait;

use crate::client::{ChatMessage, ChatRequest, OllamaClient};
use crate::DEFAULT_CHAT_MODEL;

/// Chat adapter backed by an [`OllamaClient`]. Streaming calls forward the
/// raw bytes of every response frame to the sink.
pub struct OllamaChatModel {
    client: OllamaClient,
    model: String,
}

impl OllamaChatModel {
    /// Use [`DEFAULT_CHAT_MODEL`].
    pub fn new(client: OllamaClient) -> Self {
        Self::with_model(client, DEFAULT_CHAT_MODEL)
    }

    pub fn with_model(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Map the prompt onto the wire schema, message for message. Building
    /// the request cannot currently fail; the `Result` leaves room for
    /// payload validation.
    fn chat_request(&self, prompt: &Prompt) -> Result<ChatRequest> {
        let mut request = ChatRequest {
            model: self.model.clone(),
            messages: prompt
                .messages
                .iter()
                .map(|message| ChatMessage {
                    role: message.role.as_str().to_owned(),
                    content: message.text.clone(),
                })
                .collect(),
            stream: false,
            options: prompt.options.extra.clone(),
        };
        if let Some(model) = &prompt.options.model {
            request.model = model.clone();
        }
        Ok(request)
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn call(&self, cancel: CancellationToken, prompt: Prompt) -> Result<String> {
        let request = self.chat_request(&prompt)?;
        let response = self.client.chat(cancel, request).await?;
        Ok(response.message.content)
    }

    async fn stream(
        &self,
        cancel: CancellationToken,
        prompt: Prompt,
        sink: &mut ChunkSink<'_>,
    ) -> Result<()> {
        let request = self.chat_request(&prompt)?;
        self.client.chat_stream(cancel, request, sink).await
    }
}
