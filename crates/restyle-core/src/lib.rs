//! restyle core - batch prompt-driven image transformation.
//!
//! Applies every prompt from a YAML list to every image in a directory through
//! one of three backends, writing one output file per successful pair.
//!
//! # Architecture
//!
//! ```text
//! prompts.yaml ─┐
//!               ├─► run_batch ─► ImageService::process ─► output/{stem}_{tag}_{ts}{ext}
//! data/*.png  ──┘                (ollama | openrouter | gemini)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use restyle_core::{BackendKind, BatchJob, Config};
//!
//! #[tokio::main]
//! async fn main() -> restyle_core::Result<()> {
//!     let config = Config::load()?;
//!     let job = BatchJob::prepare(BackendKind::Ollama, &config)?;
//!     let summary = job.run(|_| {}).await;
//!     println!("{} image(s) created", summary.succeeded);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod service;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, RestyleError, Result, ServiceError, ServiceResult, SourceError};
pub use job::BatchJob;
pub use output::OutputStore;
pub use pipeline::{list_images, load_prompts, run_batch};
pub use service::{ImageService, ServiceFactory, ServiceSettings};
pub use types::{BackendKind, BatchSummary, PairOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
