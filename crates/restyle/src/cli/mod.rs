//! Command-line handlers.

pub mod run;
pub mod types;
