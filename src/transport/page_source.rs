use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::debug;

use super::PageSource;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::extract::Page;

/// True for sources that should be fetched over HTTP.
pub fn is_remote_source(source: &str) -> bool {
    url::Url::parse(source)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    timeout_duration: Duration,
}

impl HttpPageSource {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let timeout_duration = Duration::from_secs(config.timeout);
        let client = Client::builder()
            .timeout(timeout_duration)
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_duration,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, source: &str) -> Result<Page> {
        if !is_remote_source(source) {
            return Err(Error::InvalidUrl(source.to_string()));
        }
        debug!("Fetching page from: {}", source);

        let request = self
            .client
            .get(source)
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send();
        let response = timeout(self.timeout_duration, request)
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", source)))?
            .map_err(|e| Error::HttpError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                source,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| Error::HttpError(format!("Failed to read response body: {}", e)))?;

        debug!("Downloaded {} bytes from {}", html.len(), final_url);
        Ok(Page::new(html, final_url))
    }
}

/// Reads saved pages from disk. The page URL is a `file://` URL of the
/// resolved path.
#[derive(Debug, Clone, Default)]
pub struct FilePageSource;

impl FilePageSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn fetch(&self, source: &str) -> Result<Page> {
        let path = Path::new(source);
        let html = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(source.to_string()),
            _ => Error::Io(e),
        })?;

        let absolute = tokio::fs::canonicalize(path).await?;
        let url = url::Url::from_file_path(&absolute)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| absolute.display().to_string());

        debug!("Read {} bytes from {}", html.len(), absolute.display());
        Ok(Page::new(html, url))
    }
}

/// Dispatches http(s) URLs to [`HttpPageSource`] and everything else to
/// [`FilePageSource`].
#[derive(Debug, Clone)]
pub struct RoutedPageSource {
    http: HttpPageSource,
    file: FilePageSource,
}

impl RoutedPageSource {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            http: HttpPageSource::new(config)?,
            file: FilePageSource::new(),
        })
    }
}

#[async_trait]
impl PageSource for RoutedPageSource {
    async fn fetch(&self, source: &str) -> Result<Page> {
        if is_remote_source(source) {
            self.http.fetch(source).await
        } else {
            self.file.fetch(source).await
        }
    }
}
