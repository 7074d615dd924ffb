//! Backend services that turn an (image, prompt) pair into an output file.
//!
//! Provides one trait over three backends: a local Ollama server, the
//! OpenRouter routing API, and the Gemini multimodal API.

pub(crate) mod gemini;
pub(crate) mod ollama;
pub(crate) mod openrouter;
pub(crate) mod provider;

pub use gemini::GeminiService;
pub use ollama::OllamaService;
pub use openrouter::OpenRouterService;
pub use provider::{resolve_env_var, ImageInput, ImageService, ServiceFactory, ServiceSettings};
