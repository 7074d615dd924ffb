//! Ollama backend for a local vision model server.
//!
//! Talks to a local Ollama instance via `/api/generate`. No authentication is
//! required; a bearer token is sent only when one is configured.
//!
//! Ollama vision models answer with text, not images, so a successful call
//! currently produces a copy of the source image (see
//! [`ImageService::is_simulated`]).

use super::provider::{ImageInput, ImageService, ServiceSettings};
use crate::error::{ServiceError, ServiceResult};
use crate::output::OutputStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Ollama backend for local inference.
pub struct OllamaService {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    store: OutputStore,
    client: reqwest::Client,
}

impl OllamaService {
    pub fn new(settings: &ServiceSettings, store: OutputStore) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            store,
            client: reqwest::Client::new(),
        }
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    images: Vec<String>,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl ImageService for OllamaService {
    fn name(&self) -> &str {
        "ollama"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn timeout(&self) -> Duration {
        // Vision models running locally can be slow
        Duration::from_secs(120)
    }

    async fn transform(&self, image: &Path, prompt: &str) -> ServiceResult<PathBuf> {
        let input = ImageInput::from_path(image).await?;
        let url = format!("{}/api/generate", self.endpoint);
        let start = Instant::now();

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            images: vec![input.data],
        };

        let mut req = self.client.post(&url).json(&body).timeout(self.timeout());
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| ServiceError::Transport {
            backend: "ollama",
            message: e.to_string(),
            status_code: None,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Transport {
                backend: "ollama",
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        match resp.json::<GenerateResponse>().await {
            Ok(reply) if !reply.response.trim().is_empty() => {
                tracing::debug!("Ollama reply: {}", reply.response.trim());
            }
            Ok(_) => tracing::debug!("Ollama returned an empty reply"),
            Err(e) => tracing::debug!("Ignoring unparseable Ollama reply: {e}"),
        }
        tracing::debug!(
            "Ollama answered in {}ms; keeping source image (no image output)",
            start.elapsed().as_millis()
        );

        self.store.copy_source(image, self.name()).await
    }
}
