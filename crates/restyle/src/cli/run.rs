//! The batch run: apply every prompt to every image with one backend.

use clap::Args;
use restyle_core::{BackendKind, BatchJob, BatchSummary, Config, PairOutcome};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::types::Backend;

/// Arguments for a batch run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Backend used to transform the images
    #[arg(value_enum)]
    pub backend: Backend,

    /// Directory of source images (overrides config)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// YAML file with the list of prompts (overrides config)
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// Directory for generated images (overrides config)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Apply command-line path overrides to the loaded config.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(input) = &args.input {
        config.general.input_dir = input.clone();
    }
    if let Some(prompts) = &args.prompts {
        config.general.prompts_file = prompts.clone();
    }
    if let Some(output) = &args.output {
        config.general.output_dir = output.clone();
    }
}

/// Execute a batch run.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    let kind = BackendKind::from(args.backend);

    let job = BatchJob::prepare(kind, &config)?;
    tracing::info!("Using backend: {kind}");

    let progress = create_progress_bar(job.pair_count() as u64);
    let start = Instant::now();

    let summary = job
        .run(|outcome| {
            if let Some(path) = &outcome.output {
                progress.set_message(format!("{}", path.display()));
            } else {
                progress.set_message(failure_message(outcome));
            }
            progress.inc(1);
        })
        .await;

    progress.finish_and_clear();
    write_summary(
        &mut std::io::stdout().lock(),
        &summary,
        start.elapsed().as_secs_f64(),
        &config.output_dir(),
    )?;

    Ok(())
}

fn failure_message(outcome: &PairOutcome) -> String {
    format!(
        "failed: {} (prompt: {:?})",
        outcome.image.display(),
        outcome.prompt
    )
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Write the summary table and the created-images line.
fn write_summary(
    out: &mut impl Write,
    summary: &BatchSummary,
    elapsed_secs: f64,
    output_dir: &Path,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  ====================================")?;
    writeln!(out, "               Summary")?;
    writeln!(out, "  ====================================")?;
    writeln!(out, "    Succeeded:    {:>8}", summary.succeeded)?;
    if summary.failed > 0 {
        writeln!(out, "    Failed:       {:>8}", summary.failed)?;
    }
    writeln!(out, "  ------------------------------------")?;
    writeln!(out, "    Pairs:        {:>8}", summary.attempted)?;
    writeln!(out, "    Duration:     {:>7.1}s", elapsed_secs)?;
    writeln!(out, "  ====================================")?;
    writeln!(
        out,
        "{} new image(s) created in {}",
        summary.succeeded,
        output_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(backend: Backend) -> RunArgs {
        RunArgs {
            backend,
            input: None,
            prompts: None,
            output: None,
        }
    }

    #[test]
    fn overrides_replace_config_paths() {
        let mut config = Config::default();
        let run = RunArgs {
            input: Some(PathBuf::from("shots")),
            output: Some(PathBuf::from("edited")),
            ..args(Backend::Gemini)
        };
        apply_overrides(&mut config, &run);
        assert_eq!(config.general.input_dir, PathBuf::from("shots"));
        assert_eq!(config.general.prompts_file, PathBuf::from("prompts.yaml"));
        assert_eq!(config.general.output_dir, PathBuf::from("edited"));
    }

    #[test]
    fn no_overrides_keep_defaults() {
        let mut config = Config::default();
        apply_overrides(&mut config, &args(Backend::Ollama));
        assert_eq!(config.general.input_dir, PathBuf::from("data"));
    }

    #[test]
    fn failure_message_names_image_and_prompt() {
        let outcome = PairOutcome {
            image_index: 0,
            prompt_index: 1,
            image: PathBuf::from("data/cat.png"),
            prompt: "make it snow".to_string(),
            output: None,
        };
        let msg = failure_message(&outcome);
        assert!(msg.contains("data/cat.png"));
        assert!(msg.contains("\"make it snow\""));
    }

    #[test]
    fn summary_reports_counts_and_output_dir() {
        let summary = BatchSummary {
            attempted: 6,
            succeeded: 5,
            failed: 1,
        };
        let mut out = Vec::new();
        write_summary(&mut out, &summary, 2.5, Path::new("output")).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Succeeded:           5"));
        assert!(text.contains("Failed:              1"));
        assert!(text.contains("Pairs:               6"));
        assert!(text.ends_with("5 new image(s) created in output\n"));
    }

    #[test]
    fn summary_omits_failed_line_when_clean() {
        let summary = BatchSummary {
            attempted: 2,
            succeeded: 2,
            failed: 0,
        };
        let mut out = Vec::new();
        write_summary(&mut out, &summary, 0.1, Path::new("output")).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("Failed"));
    }

    #[tokio::test]
    async fn execute_fails_when_prompts_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/a.png"), b"x").unwrap();

        let run = RunArgs {
            input: Some(dir.path().join("data")),
            prompts: Some(dir.path().join("missing.yaml")),
            output: Some(dir.path().join("out")),
            ..args(Backend::Ollama)
        };
        let err = execute(run, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("No prompts"));
        assert!(!dir.path().join("out").exists());
    }
}
