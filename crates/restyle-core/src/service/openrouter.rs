//! OpenRouter backend using its OpenAI-compatible Chat Completions API.
//!
//! Sends the prompt and the image (as a data URL) in one user message.
//! The routed models reply with text, so a successful call currently produces
//! a copy of the source image.

use super::provider::{ImageInput, ImageService, ServiceSettings};
use crate::error::{ConfigError, ServiceError, ServiceResult};
use crate::output::OutputStore;
use crate::types::BackendKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// OpenRouter backend.
pub struct OpenRouterService {
    api_key: String,
    model: String,
    endpoint: String,
    store: OutputStore,
    client: reqwest::Client,
}

impl OpenRouterService {
    /// Fails immediately when no API key is configured.
    pub fn new(settings: &ServiceSettings, store: OutputStore) -> Result<Self, ConfigError> {
        let api_key = settings.require_api_key(BackendKind::OpenRouter)?;
        Ok(Self {
            api_key,
            model: settings.model.clone(),
            endpoint: format!("{}/chat/completions", settings.endpoint.trim_end_matches('/')),
            store,
            client: reqwest::Client::new(),
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ImageService for OpenRouterService {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn transform(&self, image: &Path, prompt: &str) -> ServiceResult<PathBuf> {
        let input = ImageInput::from_path(image).await?;

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: prompt.to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: input.data_url(),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| ServiceError::Transport {
                backend: "openrouter",
                message: e.to_string(),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Transport {
                backend: "openrouter",
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        if let Ok(chat) = resp.json::<ChatResponse>().await {
            if let Some(text) = chat.choices.first().and_then(|c| c.message.content.as_deref()) {
                tracing::debug!("OpenRouter reply: {}", text.trim());
            }
        }

        self.store.copy_source(image, self.name()).await
    }
}
