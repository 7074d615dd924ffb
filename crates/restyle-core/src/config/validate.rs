//! Configuration validation.

use crate::error::ConfigError;

use super::Config;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

impl Config {
    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.general.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.input_dir must not be empty".into(),
            ));
        }
        if self.general.prompts_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.prompts_file must not be empty".into(),
            ));
        }
        if self.general.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.output_dir must not be empty".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }

        let ollama = self.backends.ollama();
        check_backend("ollama", &ollama.endpoint, &ollama.model)?;
        let openrouter = self.backends.openrouter();
        check_backend("openrouter", &openrouter.endpoint, &openrouter.model)?;
        let gemini = self.backends.gemini();
        check_backend("gemini", &gemini.endpoint, &gemini.model)?;
        Ok(())
    }
}

fn check_backend(name: &str, endpoint: &str, model: &str) -> Result<(), ConfigError> {
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "backends.{name}.endpoint must be an http(s) URL"
        )));
    }
    if model.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "backends.{name}.model must not be empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeminiConfig, OpenRouterConfig};
    use std::path::PathBuf;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_output_dir() {
        let mut config = Config::default();
        config.general.output_dir = PathBuf::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output_dir"));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.backends.openrouter = Some(OpenRouterConfig {
            endpoint: "openrouter.ai/api/v1".into(),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backends.openrouter.endpoint"));
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let mut config = Config::default();
        config.backends.gemini = Some(GeminiConfig {
            model: "  ".into(),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backends.gemini.model"));
    }
}
