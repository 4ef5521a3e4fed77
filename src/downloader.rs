use crate::config::RetryConfig;
use crate::error::{BookLoaderError, Result};
use crate::models::AssetStatus;
use crate::retry::with_retry;
use crate::traits::AssetDownloader;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// Streams assets to disk. The body lands in a `.part` sibling first and is
/// renamed onto the final name only after the byte count checks out, so a
/// file under the final name is always a complete download.
pub struct HttpAssetDownloader {
    client: Client,
    retry: RetryConfig,
}

impl HttpAssetDownloader {
    pub fn new(retry: &RetryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            retry: retry.clone(),
        })
    }

    async fn download_once(&self, url: &Url, dest: &Path, tmp: &Path) -> Result<()> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BookLoaderError::status(status, url.as_str()));
        }
        let declared_len = response.content_length();

        let mut file = tokio::fs::File::create(tmp).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    remove_temp(tmp).await;
                    return Err(e.into());
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                remove_temp(tmp).await;
                return Err(e.into());
            }
            written += chunk.len() as u64;
        }

        if let Err(e) = file.flush().await {
            remove_temp(tmp).await;
            return Err(e.into());
        }
        drop(file);

        if let Some(expected) = declared_len {
            if expected != written {
                remove_temp(tmp).await;
                return Err(BookLoaderError::transfer(format!(
                    "truncated transfer from {}: expected {} bytes, received {}",
                    url, expected, written
                )));
            }
        }

        tokio::fs::rename(tmp, dest).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetDownloader for HttpAssetDownloader {
    async fn download(&self, url: &Url, dest: &Path) -> Result<AssetStatus> {
        if let Ok(meta) = tokio::fs::metadata(dest).await {
            if meta.len() > 0 {
                debug!("already downloaded, skipping: {:?}", dest);
                return Ok(AssetStatus::SkippedExisting);
            }
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(dest);
        with_retry(&self.retry, || self.download_once(url, dest, &tmp)).await?;

        debug!("downloaded {} to {:?}", url, dest);
        Ok(AssetStatus::Downloaded)
    }
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn remove_temp(tmp: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp).await {
        warn!("failed to remove temporary file {:?}: {}", tmp, e);
    }
}
