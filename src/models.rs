use std::path::PathBuf;
use url::Url;

/// One book's metadata extracted from its catalog page.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub cover_url: Option<Url>,
    pub file_url: Option<Url>,
}

/// Terminal classification of processing one catalog ID.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Success {
        record: CatalogRecord,
        saved_paths: Vec<PathBuf>,
    },
    NotFound {
        id: u32,
    },
    ParseFailure {
        id: u32,
        reason: String,
    },
    TransferFailure {
        id: u32,
        reason: String,
    },
}

impl DownloadOutcome {
    pub fn id(&self) -> u32 {
        match self {
            DownloadOutcome::Success { record, .. } => record.id,
            DownloadOutcome::NotFound { id }
            | DownloadOutcome::ParseFailure { id, .. }
            | DownloadOutcome::TransferFailure { id, .. } => *id,
        }
    }
}

/// Result of one asset download attempt. The skip is a first-class value so
/// idempotent re-runs are observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Downloaded,
    SkippedExisting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunFailure {
    pub book_id: u32,
    pub reason: String,
}

/// Aggregate of one run. NotFound is counted but never listed as a failure;
/// the failures list holds only IDs worth retrying.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub not_found: usize,
    pub parse_failures: usize,
    pub transfer_failures: usize,
    pub failures: Vec<RunFailure>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success { .. } => self.succeeded += 1,
            DownloadOutcome::NotFound { .. } => self.not_found += 1,
            DownloadOutcome::ParseFailure { id, reason } => {
                self.parse_failures += 1;
                self.failures.push(RunFailure {
                    book_id: *id,
                    reason: format!("parse failure: {}", reason),
                });
            }
            DownloadOutcome::TransferFailure { id, reason } => {
                self.transfer_failures += 1;
                self.failures.push(RunFailure {
                    book_id: *id,
                    reason: format!("transfer failure: {}", reason),
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.not_found + self.parse_failures + self.transfer_failures
    }
}
