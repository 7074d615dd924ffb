//! Batch orchestration over every (image, prompt) pair.
//!
//! Pairs are processed strictly one after another, image-major and
//! prompt-minor. A failed pair only lowers the success count.

use crate::service::ImageService;
use crate::types::{BatchSummary, PairOutcome};
use std::path::PathBuf;

/// Run `service` over the cross-product of `images` and `prompts`.
///
/// `on_pair` is called after each pair, in processing order.
pub async fn run_batch<F>(
    service: &dyn ImageService,
    images: &[PathBuf],
    prompts: &[String],
    mut on_pair: F,
) -> BatchSummary
where
    F: FnMut(&PairOutcome),
{
    let mut summary = BatchSummary::default();

    for (image_index, image) in images.iter().enumerate() {
        for (prompt_index, prompt) in prompts.iter().enumerate() {
            let output = service.process(image, prompt).await;

            summary.attempted += 1;
            if output.is_some() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }

            on_pair(&PairOutcome {
                image_index,
                prompt_index,
                image: image.clone(),
                prompt: prompt.clone(),
                output,
            });
        }
    }

    tracing::info!(
        "Batch finished: {}/{} pair(s) succeeded",
        summary.succeeded,
        summary.attempted
    );
    summary
}
