//! Image service trait, request helpers, and the backend factory.
//!
//! Every backend implements [`ImageService`]. Backends only implement
//! `transform`, which may fail; the provided `process` method is the
//! boundary that logs failures and hands the caller an `Option`.

use crate::config::BackendsConfig;
use crate::error::{ConfigError, ServiceError, ServiceResult};
use crate::output::OutputStore;
use crate::types::BackendKind;
use async_trait::async_trait;
use base64::Engine;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base64-encoded image ready to send to a backend API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the file extension without the dot (e.g., "jpeg", "png").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Read a file and encode it, taking the format from its extension.
    pub async fn from_path(path: &Path) -> ServiceResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ServiceError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpeg");
        Ok(Self::from_bytes(&bytes, format))
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Trait that all image backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn ImageService>` for dynamic dispatch).
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Backend tag for logging and output names (e.g., "ollama").
    fn name(&self) -> &str;

    /// True when the backend copies the source instead of producing a
    /// model-generated image.
    fn is_simulated(&self) -> bool;

    /// Per-request timeout for this backend.
    fn timeout(&self) -> Duration;

    /// Run one (image, prompt) pair and return the written output path.
    async fn transform(&self, image: &Path, prompt: &str) -> ServiceResult<PathBuf>;

    /// Run one pair, logging any failure and returning `None` instead.
    async fn process(&self, image: &Path, prompt: &str) -> Option<PathBuf> {
        tracing::info!(
            "Processing {} with {} (prompt: {prompt:?})",
            image.display(),
            self.name()
        );
        match self.transform(image, prompt).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!("{}: {e}", image.display());
                None
            }
        }
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Empty values and unset or empty variables resolve to `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolved connection settings for one backend.
///
/// Built once at startup; services never read the environment themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl ServiceSettings {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string()).filter(|k| !k.is_empty());
        self
    }

    /// Resolve settings for `kind`, expanding `${ENV_VAR}` credentials.
    pub fn from_config(kind: BackendKind, config: &BackendsConfig) -> Self {
        let (endpoint, model, api_key) = match kind {
            BackendKind::Ollama => {
                let cfg = config.ollama();
                (cfg.endpoint, cfg.model, cfg.api_key)
            }
            BackendKind::OpenRouter => {
                let cfg = config.openrouter();
                (cfg.endpoint, cfg.model, cfg.api_key)
            }
            BackendKind::Gemini => {
                let cfg = config.gemini();
                (cfg.endpoint, cfg.model, cfg.api_key)
            }
        };
        let mut settings = Self::new(&endpoint, &model);
        settings.api_key = resolve_env_var(&api_key);
        settings
    }

    /// Return the credential, or fail for a backend that needs one.
    pub(crate) fn require_api_key(&self, kind: BackendKind) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .ok_or(ConfigError::MissingCredential {
                backend: kind.display_name(),
                env_var: kind.env_var(),
            })
    }
}

/// Factory that creates the selected backend.
pub struct ServiceFactory;

impl ServiceFactory {
    /// Create a backend from resolved settings.
    ///
    /// Fails before any work is done if a required credential is absent.
    pub fn create(
        kind: BackendKind,
        settings: &ServiceSettings,
        store: OutputStore,
    ) -> Result<Box<dyn ImageService>, ConfigError> {
        match kind {
            BackendKind::Ollama => Ok(Box::new(super::ollama::OllamaService::new(
                settings, store,
            ))),
            BackendKind::OpenRouter => Ok(Box::new(
                super::openrouter::OpenRouterService::new(settings, store)?,
            )),
            BackendKind::Gemini => Ok(Box::new(super::gemini::GeminiService::new(
                settings, store,
            )?)),
        }
    }

    /// Resolve settings from config and create the backend in one step.
    pub fn from_config(
        kind: BackendKind,
        config: &BackendsConfig,
        store: OutputStore,
    ) -> Result<Box<dyn ImageService>, ConfigError> {
        let settings = ServiceSettings::from_config(kind, config);
        Self::create(kind, &settings, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeminiConfig, OpenRouterConfig};

    #[test]
    fn test_image_input_from_bytes_jpeg() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg");
        assert_eq!(input.media_type, "image/jpeg");
        assert!(!input.data.is_empty());
    }

    #[test]
    fn test_image_input_format_is_case_insensitive() {
        let input = ImageInput::from_bytes(&[0x42, 0x4D], "BMP");
        assert_eq!(input.media_type, "image/bmp");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "png");
        assert_eq!(input.data_url(), "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_image_input_from_missing_path() {
        let err = ImageInput::from_path(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Read { .. }));
    }

    #[test]
    fn test_resolve_env_var() {
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_settings_trim_trailing_slash() {
        let settings = ServiceSettings::new("http://localhost:11434/", "llava");
        assert_eq!(settings.endpoint, "http://localhost:11434");
        assert_eq!(settings.api_key, None);
    }

    #[test]
    fn test_settings_empty_key_is_absent() {
        let settings = ServiceSettings::new("http://x", "m").with_api_key("");
        assert_eq!(settings.api_key, None);
    }

    #[test]
    fn test_settings_from_config_uses_literal_key() {
        let config = BackendsConfig {
            openrouter: Some(OpenRouterConfig {
                api_key: "sk-literal".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let settings = ServiceSettings::from_config(BackendKind::OpenRouter, &config);
        assert_eq!(settings.api_key.as_deref(), Some("sk-literal"));
        assert_eq!(settings.endpoint, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_factory_rejects_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = BackendsConfig {
            openrouter: Some(OpenRouterConfig {
                api_key: "${DEFINITELY_NOT_SET_XYZ_123}".into(),
                ..Default::default()
            }),
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                ..Default::default()
            }),
            ..Default::default()
        };

        for kind in [BackendKind::OpenRouter, BackendKind::Gemini] {
            let result = ServiceFactory::from_config(kind, &config, OutputStore::new(dir.path()));
            assert!(matches!(
                result,
                Err(ConfigError::MissingCredential { .. })
            ));
        }
    }

    #[test]
    fn test_factory_builds_ollama_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ServiceSettings::new("http://localhost:11434", "llava");
        let service =
            ServiceFactory::create(BackendKind::Ollama, &settings, OutputStore::new(dir.path()))
                .unwrap();
        assert_eq!(service.name(), "ollama");
        assert!(service.is_simulated());
    }
}
