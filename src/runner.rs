use crate::config::PacingConfig;
use crate::models::{DownloadOutcome, RunSummary};
use crate::processor::EntryProcessor;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct BatchRunner {
    processor: EntryProcessor,
    pacing: PacingConfig,
}

impl BatchRunner {
    pub fn new(processor: EntryProcessor, pacing: &PacingConfig) -> Self {
        Self {
            processor,
            pacing: pacing.clone(),
        }
    }

    /// Processes the inclusive ID range in ascending order. Every ID yields
    /// exactly one recorded outcome; per-ID failures never stop the batch.
    pub async fn run(&self, start_id: u32, end_id: u32) -> RunSummary {
        let mut summary = RunSummary::default();

        let pb = ProgressBar::new(u64::from(end_id - start_id + 1));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        for book_id in start_id..=end_id {
            pb.set_message(format!("book {}", book_id));

            let outcome = self.processor.process(book_id).await;
            match &outcome {
                DownloadOutcome::Success { record, saved_paths } => {
                    info!(
                        "✅ book {}: '{}' ({} files)",
                        record.id,
                        record.title,
                        saved_paths.len()
                    );
                }
                DownloadOutcome::NotFound { id } => {
                    debug!("book {}: not in the catalog", id);
                }
                DownloadOutcome::ParseFailure { id, reason } => {
                    warn!("❌ book {}: unrecognized page: {}", id, reason);
                }
                DownloadOutcome::TransferFailure { id, reason } => {
                    warn!("❌ book {}: {}", id, reason);
                }
            }

            debug_assert_eq!(outcome.id(), book_id);
            summary.record(&outcome);
            pb.inc(1);

            if book_id != end_id {
                tokio::time::sleep(self.pause()).await;
            }
        }

        pb.finish_with_message("run complete");
        summary
    }

    fn pause(&self) -> Duration {
        let jitter = if self.pacing.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.pacing.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.pacing.delay_ms + jitter)
    }
}
