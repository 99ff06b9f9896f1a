//! OpenAI embeddings - `POST {base_url}/embeddings`.
//!
//! The HTTP client is built on the first embedding request and reused
//! afterwards. Requests retry on 429, 5xx and transport errors with
//! exponential backoff; other 4xx fail immediately.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::ports::{EmbeddingError, EmbeddingProvider};

#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingsConfig {
    api_key: Secret<String>,
    pub model: String,
    pub dims: usize,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl OpenAIEmbeddingsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "text-embedding-3-small".to_string(),
            dims: 384,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, dims: usize) -> Self {
        self.model = model.into();
        self.dims = dims;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenAIEmbeddings {
    config: OpenAIEmbeddingsConfig,
    client: OnceCell<Client>,
}

impl OpenAIEmbeddings {
    pub fn new(config: OpenAIEmbeddingsConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client, EmbeddingError> {
        self.client
            .get_or_try_init(|| async {
                tracing::info!(model = %self.config.model, dims = self.config.dims, "initializing embedding client");
                Client::builder()
                    .timeout(self.config.timeout)
                    .build()
                    .map_err(|e| EmbeddingError::Request(e.to_string()))
            })
            .await
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }

    fn check_dims(&self, vectors: &[Vec<f32>]) -> Result<(), EmbeddingError> {
        match vectors.iter().find(|v| v.len() != self.config.dims) {
            Some(v) => Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dims,
                actual: v.len(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dims(&self) -> usize {
        self.config.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.client().await?;
        let body = serde_json::json!({
            "model": self.config.model,
            "input": texts,
            "dimensions": self.config.dims,
        });

        let mut last_err = EmbeddingError::Request("no attempts made".to_string());

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let response = client
                .post(self.embeddings_url())
                .header(
                    "Authorization",
                    format!("Bearer {}", self.config.api_key.expose_secret()),
                )
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let parsed: EmbeddingsResponse = response
                        .json()
                        .await
                        .map_err(|e| EmbeddingError::Parse(e.to_string()))?;
                    let vectors = parsed.into_ordered();
                    if vectors.len() != texts.len() {
                        return Err(EmbeddingError::Parse(format!(
                            "expected {} embeddings, got {}",
                            texts.len(),
                            vectors.len()
                        )));
                    }
                    self.check_dims(&vectors)?;
                    return Ok(vectors);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    let err = EmbeddingError::Http {
                        status: status.as_u16(),
                        body,
                    };
                    if status.as_u16() != 429 && !status.is_server_error() {
                        return Err(err);
                    }
                    tracing::warn!(error = %err, attempt, "embedding request failed");
                    last_err = err;
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "embedding request failed");
                    last_err = EmbeddingError::Request(e.to_string());
                }
            }
        }

        Err(last_err)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingsResponse {
    /// Vectors in input order.
    fn into_ordered(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|item| item.index);
        self.data.into_iter().map(|item| item.embedding).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_is_reordered_by_index() {
        let json = r#"{"data":[{"index":1,"embedding":[0.5,0.5]},{"index":0,"embedding":[1.0,0.0]}]}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_ordered(), vec![vec![1.0, 0.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let embeddings =
            OpenAIEmbeddings::new(OpenAIEmbeddingsConfig::new("k").with_model("m", 3));
        let err = embeddings.check_dims(&[vec![0.0; 3], vec![0.0; 2]]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn exposes_model_and_dims() {
        let embeddings = OpenAIEmbeddings::new(OpenAIEmbeddingsConfig::new("k"));
        assert_eq!(embeddings.model_name(), "text-embedding-3-small");
        assert_eq!(embeddings.dims(), 384);
        assert_eq!(embeddings.embeddings_url(), "https://api.openai.com/v1/embeddings");
    }

    #[tokio::test]
    async fn empty_batch_needs_no_request() {
        let embeddings = OpenAIEmbeddings::new(
            OpenAIEmbeddingsConfig::new("k").with_base_url("http://127.0.0.1:1"),
        );
        assert!(embeddings.embed(&[]).await.unwrap().is_empty());
    }
}
