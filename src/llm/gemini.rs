//! Gemini REST client
//!
//! One client serves both capabilities: document/query embeddings through
//! `embedContent` / `batchEmbedContents` and replies through
//! `generateContent`. Requests carry a per-client timeout and are never
//! retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::TextGenerator;
use crate::config::GeminiSettings;
use crate::error::{Result, TourError};
use crate::search::embedding::{EmbeddingProvider, EmbeddingTask};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    generation_model: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self> {
        let api_key = settings.api_key.clone().unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(TourError::Config(
                "Gemini API key is not set (GEMINI_API_KEY or gemini.api_key)".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| TourError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            embed_model: settings.embed_model.clone(),
            generation_model: settings.generation_model.clone(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// POST `body` and decode the JSON reply. Transport and API failures are
    /// reported through `wrap`.
    async fn post<B, R>(&self, url: &str, body: &B, wrap: fn(String) -> TourError) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "request failed");
                wrap(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Gemini", %status, "API error");
            return Err(wrap(format!("API returned {status}: {detail}")));
        }

        response.json::<R>().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            wrap(format!("failed to parse response: {e}"))
        })
    }

    fn embed_request(&self, text: &str, task: EmbeddingTask) -> EmbedRequest {
        EmbedRequest {
            model: format!("models/{}", self.embed_model),
            content: Content::text(text),
            task_type: task_type(task),
        }
    }
}

fn task_type(task: EmbeddingTask) -> &'static str {
    match task {
        EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
        EmbeddingTask::Query => "RETRIEVAL_QUERY",
    }
}

// Wire types

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        Some(content.parts.into_iter().map(|p| p.text).collect())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), ?task, "embedding single text");

        let url = self.endpoint(&self.embed_model, "embedContent");
        let response: EmbedResponse = self
            .post(&url, &self.embed_request(text, task), TourError::EmbeddingService)
            .await?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str], task: EmbeddingTask) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "Gemini",
            batch_size = texts.len(),
            model = %self.embed_model,
            "embedding batch"
        );

        let request = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.embed_request(t, task)).collect(),
        };
        let url = self.endpoint(&self.embed_model, "batchEmbedContents");
        let response: BatchEmbedResponse =
            self.post(&url, &request, TourError::EmbeddingService).await?;

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            provider = "Gemini",
            prompt_len = prompt.len(),
            model = %self.generation_model,
            "generating reply"
        );

        let request = GenerateRequest {
            contents: vec![Content::text(prompt)],
        };
        let url = self.endpoint(&self.generation_model, "generateContent");
        let response: GenerateResponse =
            self.post(&url, &request, TourError::GenerationService).await?;
        response
            .into_text()
            .ok_or_else(|| TourError::GenerationService("no candidates returned".to_string()))
    }
}
