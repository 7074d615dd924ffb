//! Gemini backend using the `generateContent` REST API.
//!
//! The source is decoded into an in-memory image first, so unreadable or
//! corrupt files fail before any network call. The response is scanned for a
//! generated image (saved as PNG); a text-only answer falls back to copying
//! the source under the `gemini_text` tag.

use super::provider::{ImageInput, ImageService, ServiceSettings};
use crate::error::{ConfigError, ServiceError, ServiceResult};
use crate::output::OutputStore;
use crate::types::BackendKind;
use async_trait::async_trait;
use base64::Engine;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tag used when Gemini answers with text only.
const TEXT_FALLBACK_TAG: &str = "gemini_text";

/// Gemini multimodal backend.
pub struct GeminiService {
    api_key: String,
    model: String,
    endpoint: String,
    store: OutputStore,
    client: reqwest::Client,
}

impl GeminiService {
    /// Fails immediately when no API key is configured.
    pub fn new(settings: &ServiceSettings, store: OutputStore) -> Result<Self, ConfigError> {
        let api_key = settings.require_api_key(BackendKind::Gemini)?;
        Ok(Self {
            api_key,
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            store,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

/// What the first candidate of a response carried.
#[derive(Debug, PartialEq)]
enum Reply {
    /// Decoded bytes of the first inline image part
    Image(Vec<u8>),
    /// Text parts only
    Text(Vec<String>),
    Empty,
}

/// Scan the first candidate's parts in order, stopping at the first image.
fn interpret(response: &GenerateContentResponse) -> ServiceResult<Reply> {
    let parts = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or_default();

    let mut texts = Vec::new();
    for part in parts {
        if let Some(text) = &part.text {
            tracing::info!("Gemini text reply: {text}");
            texts.push(text.clone());
        } else if let Some(inline) = &part.inline_data {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(inline.data.trim())
                .map_err(|e| ServiceError::Response {
                    backend: "gemini",
                    message: format!("inline image is not valid base64: {e}"),
                })?;
            return Ok(Reply::Image(bytes));
        }
    }

    if texts.is_empty() {
        Ok(Reply::Empty)
    } else {
        Ok(Reply::Text(texts))
    }
}

/// Decode the source file into an in-memory image.
async fn open_image(path: &Path) -> ServiceResult<DynamicImage> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let reader = ImageReader::open(&owned)
            .map_err(|e| ServiceError::Read {
                path: owned.clone(),
                message: e.to_string(),
            })?
            .with_guessed_format()
            .map_err(|e| ServiceError::Read {
                path: owned.clone(),
                message: e.to_string(),
            })?;
        reader.decode().map_err(|e| ServiceError::Decode {
            path: owned.clone(),
            message: e.to_string(),
        })
    })
    .await
    .map_err(|e| ServiceError::Decode {
        path: path.to_path_buf(),
        message: format!("Task join error: {e}"),
    })?
}

fn encode_png(image: &DynamicImage, path: &Path) -> ServiceResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ServiceError::Decode {
            path: path.to_path_buf(),
            message: format!("PNG encoding failed: {e}"),
        })?;
    Ok(buf.into_inner())
}

#[async_trait]
impl ImageService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_simulated(&self) -> bool {
        false
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn transform(&self, image: &Path, prompt: &str) -> ServiceResult<PathBuf> {
        let source = open_image(image).await?;
        let input = ImageInput::from_bytes(&encode_png(&source, image)?, "png");

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                    RequestPart::Inline {
                        inline_data: InlineData {
                            mime_type: input.media_type,
                            data: input.data,
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| ServiceError::Transport {
                backend: "gemini",
                message: e.to_string(),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Transport {
                backend: "gemini",
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: GenerateContentResponse =
            resp.json().await.map_err(|e| ServiceError::Response {
                backend: "gemini",
                message: e.to_string(),
            })?;

        match interpret(&parsed)? {
            Reply::Image(bytes) => {
                let generated =
                    image::load_from_memory(&bytes).map_err(|e| ServiceError::Decode {
                        path: image.to_path_buf(),
                        message: format!("generated image: {e}"),
                    })?;
                self.store.save_png(image, self.name(), &generated).await
            }
            Reply::Text(_) => {
                tracing::info!("Gemini returned text but no image; keeping source image");
                self.store.copy_source(image, TEXT_FALLBACK_TAG).await
            }
            Reply::Empty => Err(ServiceError::EmptyResponse { backend: "gemini" }),
        }
    }
}
