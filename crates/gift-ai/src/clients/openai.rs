use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Embedder, ExplanationWriter, ExternalServiceError};
use crate::config::CollaboratorConfig;

const EMBEDDING_SERVICE: &str = "embedding";
const CHAT_SERVICE: &str = "chat";

/// OpenAI-compatible client covering both collaborator roles the engine
/// needs: embeddings for the semantic path and chat completions for
/// explanations.
///
/// Embeddings are cached by exact input text for the lifetime of the client,
/// which keeps repeated queries deterministic and cheap.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    embedding_model: String,
    chat_model: String,
    embedding_cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl OpenAiClient {
    pub fn new(config: &CollaboratorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            embedding_cache: Mutex::new(HashMap::new()),
        }
    }

    /// A poisoned lock only means another request panicked mid-insert; the
    /// cached vectors are still usable, so recover the guard.
    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<f32>>> {
        self.embedding_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn post(
        &self,
        service: &'static str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ExternalServiceError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ExternalServiceError::Request {
                service,
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExternalServiceError::Request {
                service,
                reason: format!("status {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|err| ExternalServiceError::Payload {
                service,
                reason: err.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ExternalServiceError> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut missing: Vec<(usize, String)> = Vec::new();

        {
            let cache = self.cache();
            for (position, text) in texts.iter().enumerate() {
                match cache.get(text) {
                    Some(vector) => results[position] = Some(vector.clone()),
                    None => missing.push((position, text.clone())),
                }
            }
        }

        if !missing.is_empty() {
            let inputs: Vec<&str> = missing.iter().map(|(_, text)| text.as_str()).collect();
            let payload = self
                .post(
                    EMBEDDING_SERVICE,
                    "/embeddings",
                    json!({ "model": self.embedding_model, "input": inputs }),
                )
                .await?;

            let parsed: EmbeddingResponse =
                serde_json::from_value(payload).map_err(|err| ExternalServiceError::Payload {
                    service: EMBEDDING_SERVICE,
                    reason: err.to_string(),
                })?;

            if parsed.data.len() != missing.len() {
                return Err(ExternalServiceError::Payload {
                    service: EMBEDDING_SERVICE,
                    reason: format!(
                        "expected {} vectors, received {}",
                        missing.len(),
                        parsed.data.len()
                    ),
                });
            }

            let mut cache = self.cache();
            for datum in parsed.data {
                let (position, text) =
                    missing
                        .get(datum.index)
                        .ok_or_else(|| ExternalServiceError::Payload {
                            service: EMBEDDING_SERVICE,
                            reason: format!("vector index {} out of range", datum.index),
                        })?;
                cache.insert(text.clone(), datum.embedding.clone());
                results[*position] = Some(datum.embedding);
            }

            debug!(
                requested = texts.len(),
                fetched = missing.len(),
                "embedding batch resolved"
            );
        }

        results
            .into_iter()
            .map(|entry| {
                entry.ok_or_else(|| ExternalServiceError::Payload {
                    service: EMBEDDING_SERVICE,
                    reason: "embedding response left a gap".to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ExplanationWriter for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ExternalServiceError> {
        let payload = self
            .post(
                CHAT_SERVICE,
                "/chat/completions",
                json!({
                    "model": self.chat_model,
                    "messages": [{ "role": "user", "content": prompt }],
                    "temperature": 0.7,
                }),
            )
            .await?;

        let parsed: ChatResponse =
            serde_json::from_value(payload).map_err(|err| ExternalServiceError::Payload {
                service: CHAT_SERVICE,
                reason: err.to_string(),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ExternalServiceError::Payload {
                service: CHAT_SERVICE,
                reason: "response carried no choices".to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}
