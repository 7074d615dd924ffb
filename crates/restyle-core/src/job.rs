//! A prepared batch run: inputs loaded, backend built, output ready.
//!
//! All fatal conditions are checked in [`BatchJob::prepare`], so a job that
//! exists can always be run; only per-pair failures remain.

use crate::config::Config;
use crate::error::{Result, SourceError};
use crate::output::OutputStore;
use crate::pipeline::{list_images, load_prompts, run_batch};
use crate::service::{ImageService, ServiceFactory};
use crate::types::{BackendKind, BatchSummary, PairOutcome};
use std::path::PathBuf;

/// Everything needed to run one batch.
pub struct BatchJob {
    service: Box<dyn ImageService>,
    images: Vec<PathBuf>,
    prompts: Vec<String>,
}

impl BatchJob {
    /// Load prompts and images, build the backend, and create the output dir.
    ///
    /// Fails without processing anything if there are no prompts, no images,
    /// or the selected backend lacks its credential.
    pub fn prepare(kind: BackendKind, config: &Config) -> Result<Self> {
        let prompts_file = config.prompts_file();
        let prompts = load_prompts(&prompts_file);
        if prompts.is_empty() {
            return Err(SourceError::NoPrompts(prompts_file).into());
        }

        let input_dir = config.input_dir();
        let images = list_images(&input_dir);
        if images.is_empty() {
            return Err(SourceError::NoImages(input_dir).into());
        }

        let store = OutputStore::new(config.output_dir());
        let service = ServiceFactory::from_config(kind, &config.backends, store.clone())?;
        if service.is_simulated() {
            tracing::warn!(
                "The {} backend does not return images yet; outputs are copies of the sources",
                service.name()
            );
        }
        store.ensure_dir()?;

        Ok(Self::from_parts(service, images, prompts))
    }

    /// Assemble a job from already-loaded parts.
    pub fn from_parts(
        service: Box<dyn ImageService>,
        images: Vec<PathBuf>,
        prompts: Vec<String>,
    ) -> Self {
        Self {
            service,
            images,
            prompts,
        }
    }

    pub fn service(&self) -> &dyn ImageService {
        self.service.as_ref()
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Number of (image, prompt) pairs the run will attempt.
    pub fn pair_count(&self) -> usize {
        self.images.len() * self.prompts.len()
    }

    /// Process every pair in order.
    pub async fn run<F>(&self, on_pair: F) -> BatchSummary
    where
        F: FnMut(&PairOutcome),
    {
        tracing::info!(
            "Processing {} image(s) with {} prompt(s) using {}",
            self.images.len(),
            self.prompts.len(),
            self.service.name()
        );
        run_batch(self.service.as_ref(), &self.images, &self.prompts, on_pair).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenRouterConfig};
    use crate::error::{ConfigError, RestyleError};
    use serde_json::json;
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Lay out `data/`, `prompts.yaml` and point `output` at a fresh dir.
    fn workspace(root: &Path, images: &[&str], prompts_yaml: &str) -> Config {
        let data = root.join("data");
        std::fs::create_dir_all(&data).unwrap();
        for name in images {
            std::fs::write(data.join(name), name.as_bytes()).unwrap();
        }
        std::fs::write(root.join("prompts.yaml"), prompts_yaml).unwrap();

        let mut config = Config::default();
        config.general.input_dir = data;
        config.general.prompts_file = root.join("prompts.yaml");
        config.general.output_dir = root.join("output");
        config
    }

    fn with_ollama(mut config: Config, endpoint: &str) -> Config {
        config.backends.ollama = Some(OllamaConfig {
            endpoint: endpoint.to_string(),
            model: "llava".into(),
            api_key: String::new(),
        });
        config
    }

    #[test]
    fn test_prepare_fails_without_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path(), &["a.png"], "not: a list\n");
        let err = BatchJob::prepare(BackendKind::Ollama, &config).err().unwrap();
        assert!(matches!(err, RestyleError::Source(SourceError::NoPrompts(_))));
        assert!(!dir.path().join("output").exists());
    }

    #[test]
    fn test_prepare_fails_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path(), &["notes.txt"], "- a\n");
        let err = BatchJob::prepare(BackendKind::Ollama, &config).err().unwrap();
        assert!(matches!(err, RestyleError::Source(SourceError::NoImages(_))));
    }

    #[test]
    fn test_prepare_fails_fast_on_missing_credential() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = workspace(dir.path(), &["a.png"], "- a\n");
        config.backends.openrouter = Some(OpenRouterConfig {
            api_key: String::new(),
            ..Default::default()
        });

        let err = BatchJob::prepare(BackendKind::OpenRouter, &config)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RestyleError::Config(ConfigError::MissingCredential { .. })
        ));
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn test_prepare_and_run_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
            .expect(4)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = with_ollama(
            workspace(dir.path(), &["a.png", "b.JPG", "skip.txt"], "- one\n- two\n"),
            &server.uri(),
        );

        let job = BatchJob::prepare(BackendKind::Ollama, &config).unwrap();
        assert_eq!(job.pair_count(), 4);
        assert!(dir.path().join("output").is_dir());

        let summary = job.run(|_| {}).await;
        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed, 0);

        let written = std::fs::read_dir(dir.path().join("output")).unwrap().count();
        assert_eq!(written, 4);
    }

    #[tokio::test]
    async fn test_run_with_failing_backend_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = with_ollama(
            workspace(dir.path(), &["a.png", "b.png"], "- one\n- two\n- three\n"),
            &server.uri(),
        );

        let job = BatchJob::prepare(BackendKind::Ollama, &config).unwrap();
        let summary = job.run(|_| {}).await;

        assert_eq!(summary.attempted, 6);
        assert_eq!(summary.succeeded, 0);
        let written = std::fs::read_dir(dir.path().join("output")).unwrap().count();
        assert_eq!(written, 0);
    }
}
