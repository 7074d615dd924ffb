//! restyle CLI - apply text prompts to a directory of images.
//!
//! Every prompt in `prompts.yaml` is applied to every image in `data/`
//! through the selected backend; results land in `output/`.
//!
//! # Usage
//!
//! ```bash
//! # Local Ollama server
//! restyle ollama
//!
//! # Gemini, with keys from .env
//! restyle gemini --input ./photos --output ./edited
//! ```

use clap::Parser;
use std::path::PathBuf;

mod cli;
mod logging;

/// restyle - apply text prompts to a directory of images with an AI backend.
#[derive(Parser, Debug)]
#[command(name = "restyle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "RESTYLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: cli::run::RunArgs,
}

/// Load config from an explicit path (errors are fatal) or the default
/// location (errors fall back to defaults).
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<restyle_core::Config> {
    if let Some(path) = path {
        return restyle_core::Config::load_from(path).map_err(|e| {
            anyhow::anyhow!("Failed to load config {}: {e}", path.display())
        });
    }

    // Logging isn't initialized yet, so use eprintln for config warnings.
    Ok(restyle_core::Config::load().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config: {e}\n  \
             Using default configuration. Config path: {}",
            restyle_core::Config::default_path().display()
        );
        restyle_core::Config::default()
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials may live in a local .env file; a missing file is fine.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("restyle v{}", restyle_core::VERSION);

    cli::run::execute(cli.run, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_backend_positional() {
        let cli = Cli::try_parse_from(["restyle", "gemini"]).unwrap();
        assert_eq!(cli.run.backend, cli::types::Backend::Gemini);
        assert!(!cli.verbose);
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["restyle", "dalle"]).is_err());
        assert!(Cli::try_parse_from(["restyle"]).is_err());
    }

    #[test]
    fn explicit_config_errors_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"shouting\"\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\noutput_dir = \"edited\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("edited"));
    }
}
