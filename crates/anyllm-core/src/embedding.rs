use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::prompt::CallOptions;

/// A batch embedding request. Inputs are embedded in submission order.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingRequest {
    pub inputs: Vec<String>,
    pub options: CallOptions,
}

impl EmbeddingRequest {
    pub fn new(
        inputs: impl IntoIterator<Item = impl Into<String>>,
        options: CallOptions,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            options,
        }
    }
}

/// One embedding vector, tagged with the position of the input it belongs
/// to: `embeddings[i].index == i` for every successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingResponse {
    pub embeddings: Vec<Embedding>,
}

impl EmbeddingResponse {
    /// The vectors in input order.
    pub fn into_vectors(self) -> Vec<Vec<f32>> {
        self.embeddings.into_iter().map(|e| e.vector).collect()
    }
}

/// An embedding-capable backend adapter.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn call(
        &self,
        cancel: CancellationToken,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse>;
}

/// Front end over a configured [`EmbeddingModel`].
pub struct Embedder {
    model: Box<dyn EmbeddingModel>,
}

impl Embedder {
    pub fn new(model: impl EmbeddingModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// Embed one text and return its vector. Equivalent to the first result
    /// of a one-input batch.
    pub async fn embed(&self, cancel: CancellationToken, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(cancel, &[text.to_owned()]).await?;
        if vectors.is_empty() {
            return Err(Error::Provider {
                status: None,
                message: "embedding response was empty".into(),
            });
        }
        Ok(vectors.swap_remove(0))
    }

    /// Embed a batch of texts in one backend call, returning vectors in
    /// input order.
    pub async fn embed_batch(
        &self,
        cancel: CancellationToken,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest::new(texts.iter().cloned(), CallOptions::default());
        let response = self.model.call(cancel, request).await?;
        Ok(response.into_vectors())
    }
}
