use crate::config::{RetryConfig, SiteConfig};
use crate::error::{BookLoaderError, Result};
use crate::retry::with_retry;
use crate::traits::PageFetcher;
use reqwest::{redirect, Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_USER_AGENT: &str = "BookLoader/1.0 (Personal Book Archiver)";

/// Fetches catalog pages over HTTP. Redirects are never followed: the
/// catalog answers missing IDs with a redirect to its front page, so a 3xx
/// is a not-found signal, not a page.
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    page_path: String,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub fn new(site: &SiteConfig, retry: &RetryConfig) -> Result<Self> {
        let user_agent = site
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(redirect::Policy::none())
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&site.base_url)?,
            page_path: site.page_path.clone(),
            retry: retry.clone(),
        })
    }

    pub fn page_url(&self, book_id: u32) -> Result<Url> {
        let path = self.page_path.replace("{id}", &book_id.to_string());
        Ok(self.base_url.join(&path)?)
    }

    async fn fetch_once(&self, book_id: u32, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status.is_redirection() || status == StatusCode::NOT_FOUND {
            return Err(BookLoaderError::NotFound(book_id));
        }
        if !status.is_success() {
            return Err(BookLoaderError::status(status, url.as_str()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, book_id: u32) -> Result<String> {
        let url = self.page_url(book_id)?;
        debug!("fetching catalog page: {}", url);
        with_retry(&self.retry, || self.fetch_once(book_id, &url)).await
    }
}
