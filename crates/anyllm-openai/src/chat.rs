use anyllm_core::{CancellationToken, ChatModel, ChunkSink, Error, Prompt, Result};
use async_trait::async_trait;

use crate::client::{ChatCompletionMessage, ChatCompletionRequest, OpenAiClient};
use crate::DEFAULT_CHAT_MODEL;

/// Chat adapter backed by an [`OpenAiClient`]. Streaming calls forward the
/// extracted delta content of each chunk to the sink.
pub struct OpenAiChatModel {
    client: OpenAiClient,
    model: String,
}

impl OpenAiChatModel {
    /// Use [`DEFAULT_CHAT_MODEL`].
    pub fn new(client: OpenAiClient) -> Self {
        Self::with_model(client, DEFAULT_CHAT_MODEL)
    }

    pub fn with_model(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Map the prompt onto the wire schema, message for message. The
    /// chat-completions schema has no free-form options object, so
    /// `CallOptions::extra` is not forwarded. Building the request cannot
    /// currently fail; the `Result` leaves room for payload validation.
    fn chat_request(&self, prompt: &Prompt) -> Result<ChatCompletionRequest> {
        let mut request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: prompt
                .messages
                .iter()
                .map(|message| ChatCompletionMessage {
                    role: message.role.as_str().to_owned(),
                    content: message.text.clone(),
                })
                .collect(),
            stream: false,
        };
        if let Some(model) = &prompt.options.model {
            request.model = model.clone();
        }
        Ok(request)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn call(&self, cancel: CancellationToken, prompt: Prompt) -> Result<String> {
        let request = self.chat_request(&prompt)?;
        let response = self.client.chat_completion(cancel, request).await?;
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            Error::Provider {
                status: None,
                message: "response contained no choices".into(),
            }
        })?;
        Ok(choice.message.content)
    }

    async fn stream(
        &self,
        cancel: CancellationToken,
        prompt: Prompt,
        sink: &mut ChunkSink<'_>,
    ) -> Result<()> {
        let request = self.chat_request(&prompt)?;
        let mut forward = |delta: &[u8]| sink(delta).map_err(Error::Sink);
        self.client
            .chat_completion_stream(cancel, request, &mut forward)
            .await
    }
}
