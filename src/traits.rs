use crate::error::Result;
use crate::models::AssetStatus;
use std::path::Path;
use url::Url;

/// Trait for fetching the raw catalog page of one book ID.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body, or `NotFound` when the catalog has no such ID.
    async fn fetch_page(&self, book_id: u32) -> Result<String>;
}

/// Trait for streaming one asset (cover image or book file) to disk.
#[async_trait::async_trait]
pub trait AssetDownloader: Send + Sync {
    /// Download `url` to `dest`, skipping existing non-empty files.
    async fn download(&self, url: &Url, dest: &Path) -> Result<AssetStatus>;
}
