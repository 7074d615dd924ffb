//! Error types for the restyle batch pipeline.
//!
//! Errors are split by where they can occur: configuration (fatal, before any
//! work), input sources (fatal, before any work) and per-pair service calls
//! (logged and swallowed at the service boundary).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for restyle operations.
#[derive(Error, Debug)]
pub enum RestyleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Prompt or image source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A backend that requires a credential was selected without one
    #[error("{backend} API key is required. Set {env_var} in the environment or .env file.")]
    MissingCredential {
        backend: &'static str,
        env_var: &'static str,
    },

    /// Unknown backend token
    #[error("Unknown backend: {0} (expected one of: ollama, openrouter, gemini)")]
    UnknownBackend(String),
}

/// Errors raised while loading prompts.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Prompt file does not exist
    #[error("Prompt file not found: {0}")]
    NotFound(PathBuf),

    /// Prompt file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Prompt file is not valid YAML
    #[error("Failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Prompt file parsed, but has the wrong shape
    #[error("{path} must contain a list of prompts: {message}")]
    Shape { path: PathBuf, message: String },

    /// No usable prompts; nothing to do
    #[error("No prompts found in {0}")]
    NoPrompts(PathBuf),

    /// No supported images in the input directory; nothing to do
    #[error("No images found in {0}")]
    NoImages(PathBuf),
}

/// Per-pair failures inside a backend service.
///
/// These never escape [`crate::service::ImageService::process`]; they are
/// logged there and turned into an absent result.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Source image could not be read from disk
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Source or returned image could not be decoded
    #[error("Failed to decode image {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Network call failed or returned a non-success status
    #[error("{backend} request failed: {message}")]
    Transport {
        backend: &'static str,
        message: String,
        status_code: Option<u16>,
    },

    /// Response body could not be interpreted
    #[error("Malformed {backend} response: {message}")]
    Response {
        backend: &'static str,
        message: String,
    },

    /// Response carried neither image nor text content
    #[error("{backend} returned no image or text content")]
    EmptyResponse { backend: &'static str },

    /// Result could not be written to the output directory
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Convenience type alias for restyle results.
pub type Result<T> = std::result::Result<T, RestyleError>;

/// Convenience type alias for service results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
