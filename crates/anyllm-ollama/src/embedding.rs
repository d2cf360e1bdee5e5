use anyllm_core::{
    CancellationToken, Embedding, EmbeddingModel, EmbeddingRequest, EmbeddingResponse, Result,
};
use async_trait::async_trait;

use crate::client::{EmbedRequest, OllamaClient};
use crate::DEFAULT_EMBEDDING_MODEL;

/// Embedding adapter backed by an [`OllamaClient`].
///
/// All inputs of a request are batched into a single `/api/embed` call.
/// Embeddings are indexed by input position; the backend is assumed to
/// return them in submission order (the wire format carries no correlation
/// id per input).
pub struct OllamaEmbeddingModel {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbeddingModel {
    /// Use [`DEFAULT_EMBEDDING_MODEL`].
    pub fn new(client: OllamaClient) -> Self {
        Self::with_model(client, DEFAULT_EMBEDDING_MODEL)
    }

    pub fn with_model(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbeddingModel {
    async fn call(
        &self,
        cancel: CancellationToken,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse> {
        let wire = EmbedRequest {
            model: request
                .options
                .model
                .clone()
                .unwrap_or_else(|| self.model.clone()),
            input: request.inputs,
            options: request.options.extra,
        };
        let response = self.client.embed(cancel, wire).await?;
        let embeddings = response
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(index, vector)| Embedding { vector, index })
            .collect();
        Ok(EmbeddingResponse { embeddings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyllm_core::CallOptions;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn embeddings_are_indexed_by_input_position() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({
                    "embeddings": [[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]]
                })
                .to_string(),
                "application/json",
            ))
            .mount(&server)
            .await;

        let model = OllamaEmbeddingModel::new(OllamaClient::new(server.uri()));
        let response = model
            .call(
                CancellationToken::new(),
                EmbeddingRequest::new(["a", "b", "c"], CallOptions::default()),
            )
            .await
            .expect("embed");

        assert_eq!(response.embeddings.len(), 3);
        for (i, embedding) in response.embeddings.iter().enumerate() {
            assert_eq!(embedding.index, i);
        }
        assert_eq!(response.embeddings[2].vector, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn model_override_reaches_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_string_contains("custom-embedder"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({"embeddings": [[1.0]]}).to_string(),
                "application/json",
            ))
            .mount(&server)
            .await;

        let model = OllamaEmbeddingModel::new(OllamaClient::new(server.uri()));
        let request = EmbeddingRequest::new(
            ["x"],
            CallOptions {
                model: Some("custom-embedder".into()),
                ..CallOptions::default()
            },
        );
        let response = model
            .call(CancellationToken::new(), request)
            .await
            .expect("embed");
        assert_eq!(response.embeddings.len(), 1);
    }
}
