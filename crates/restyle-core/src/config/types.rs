//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Flat directory of source images
    pub input_dir: PathBuf,

    /// YAML file holding a list of prompts
    pub prompts_file: PathBuf,

    /// Directory receiving one file per successful pair
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            prompts_file: PathBuf::from("prompts.yaml"),
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Per-backend configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackendsConfig {
    /// Local Ollama server
    pub ollama: Option<OllamaConfig>,

    /// OpenRouter routing API
    pub openrouter: Option<OpenRouterConfig>,

    /// Gemini multimodal API
    pub gemini: Option<GeminiConfig>,
}

impl BackendsConfig {
    pub fn ollama(&self) -> OllamaConfig {
        self.ollama.clone().unwrap_or_default()
    }

    pub fn openrouter(&self) -> OpenRouterConfig {
        self.openrouter.clone().unwrap_or_default()
    }

    pub fn gemini(&self) -> GeminiConfig {
        self.gemini.clone().unwrap_or_default()
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Optional bearer token (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llava".to_string(),
            api_key: "${OLLAMA_API_KEY}".to_string(),
        }
    }
}

/// OpenRouter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// API base URL; `/chat/completions` is appended
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1".to_string(),
            api_key: "${OPENROUTER_API_KEY}".to_string(),
            model: "google/gemini-pro-vision".to_string(),
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL; `/models/{model}:generateContent` is appended
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.5-flash-image".to_string(),
        }
    }
}
