//! CLI enum types.

use clap::ValueEnum;
use restyle_core::BackendKind;

/// Supported backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Local Ollama server (no API key needed)
    Ollama,
    /// OpenRouter API (needs OPENROUTER_API_KEY)
    Openrouter,
    /// Google Gemini API (needs GEMINI_API_KEY)
    Gemini,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Ollama => BackendKind::Ollama,
            Backend::Openrouter => BackendKind::OpenRouter,
            Backend::Gemini => BackendKind::Gemini,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", BackendKind::from(*self))
    }
}
