//! Batch pipeline components.
//!
//! - **prompts**: Load the prompt list from YAML
//! - **discovery**: Find image files in the input directory
//! - **runner**: Drive every (image, prompt) pair through a backend

pub mod discovery;
pub mod prompts;
pub mod runner;

pub use discovery::{is_supported, list_images, SUPPORTED_EXTENSIONS};
pub use prompts::{load_prompts, try_load_prompts};
pub use runner::run_batch;
