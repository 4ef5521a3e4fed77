use crate::error::BookLoaderError;
use crate::extractor::MetadataExtractor;
use crate::models::{CatalogRecord, DownloadOutcome};
use crate::storage::StorageManager;
use crate::traits::{AssetDownloader, PageFetcher};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

/// Runs one catalog ID through fetch, parse and asset download. Every
/// failure is converted into a terminal outcome at this boundary; the batch
/// loop never sees an error.
pub struct EntryProcessor {
    fetcher: Box<dyn PageFetcher>,
    downloader: Box<dyn AssetDownloader>,
    extractor: MetadataExtractor,
    storage: StorageManager,
}

impl EntryProcessor {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        downloader: Box<dyn AssetDownloader>,
        extractor: MetadataExtractor,
        storage: StorageManager,
    ) -> Self {
        Self {
            fetcher,
            downloader,
            extractor,
            storage,
        }
    }

    pub async fn process(&self, book_id: u32) -> DownloadOutcome {
        let html = match self.fetcher.fetch_page(book_id).await {
            Ok(html) => html,
            Err(BookLoaderError::NotFound(_)) => {
                debug!("book {} is not in the catalog", book_id);
                return DownloadOutcome::NotFound { id: book_id };
            }
            Err(e) => {
                return DownloadOutcome::TransferFailure {
                    id: book_id,
                    reason: e.to_string(),
                }
            }
        };

        let record = match self.extractor.extract(book_id, &html) {
            Ok(record) => record,
            Err(e) => {
                return DownloadOutcome::ParseFailure {
                    id: book_id,
                    reason: e.to_string(),
                }
            }
        };

        self.download_assets(record).await
    }

    async fn download_assets(&self, record: CatalogRecord) -> DownloadOutcome {
        let book_dir = match self.storage.book_dir(&record).await {
            Ok(dir) => dir,
            Err(e) => {
                return DownloadOutcome::TransferFailure {
                    id: record.id,
                    reason: format!("cannot create book directory: {}", e),
                }
            }
        };

        let mut assets: Vec<(&str, &Url, PathBuf)> = Vec::new();
        if let Some(url) = &record.cover_url {
            assets.push(("cover", url, self.storage.cover_path(&book_dir, url)));
        }
        if let Some(url) = &record.file_url {
            assets.push((
                "book file",
                url,
                self.storage.book_file_path(&book_dir, &record, url),
            ));
        }

        let mut saved_paths = Vec::new();
        let mut failures = Vec::new();

        // Each asset stands on its own: a broken file link must not undo a
        // cover that is already on disk.
        for (label, url, dest) in assets {
            match self.downloader.download(url, &dest).await {
                Ok(status) => {
                    debug!("book {}: {} {:?} ({:?})", record.id, label, dest, status);
                    saved_paths.push(dest);
                }
                Err(e) => {
                    warn!("book {}: {} download failed: {}", record.id, label, e);
                    failures.push(format!("{}: {}", label, e));
                }
            }
        }

        if !failures.is_empty() {
            return DownloadOutcome::TransferFailure {
                id: record.id,
                reason: failures.join("; "),
            };
        }

        info!(
            "book {} archived: '{}' by {} ({} files)",
            record.id,
            record.title,
            record.author,
            saved_paths.len()
        );
        DownloadOutcome::Success {
            record,
            saved_paths,
        }
    }
}
