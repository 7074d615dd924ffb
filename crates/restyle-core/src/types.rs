//! Core data types shared across the pipeline.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The backend variant selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local inference server (Ollama)
    Ollama,
    /// Multi-model routing API (OpenRouter)
    OpenRouter,
    /// Cloud multimodal API (Gemini)
    Gemini,
}

impl BackendKind {
    /// All variants, in CLI order.
    pub const ALL: [BackendKind; 3] = [Self::Ollama, Self::OpenRouter, Self::Gemini];

    /// Tag used on the command line and in output filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenRouter => "openrouter",
            Self::Gemini => "gemini",
        }
    }

    /// Human-readable name for diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenRouter => "OpenRouter",
            Self::Gemini => "Gemini",
        }
    }

    /// Environment variable conventionally holding this backend's key.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Ollama => "OLLAMA_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Whether construction must fail when no credential is available.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| ConfigError::UnknownBackend(s.to_string()))
    }
}

/// Counters for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Pairs handed to the backend
    pub attempted: usize,
    /// Pairs that produced an output file
    pub succeeded: usize,
    /// Pairs that produced nothing
    pub failed: usize,
}

/// Report for one (image, prompt) pair, emitted as the batch progresses.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub image_index: usize,
    pub prompt_index: usize,
    pub image: PathBuf,
    pub prompt: String,
    pub output: Option<PathBuf>,
}

impl PairOutcome {
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}
