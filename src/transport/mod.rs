//! Collaborators around the extraction core: where pages come from, where
//! finished documents go, and the request/response channel tying them
//! together.

pub mod messages;
pub mod page_source;
pub mod service;
pub mod sink;

use async_trait::async_trait;

use crate::error::Result;
use crate::extract::Page;

pub use messages::{Request, Response};
pub use page_source::{is_remote_source, FilePageSource, HttpPageSource, RoutedPageSource};
pub use service::ExportService;
pub use sink::{LocalFileSink, RemoteSink};

/// Loads the markup of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `source`, an http(s) URL or a path, depending on the implementation.
    async fn fetch(&self, source: &str) -> Result<Page>;
}

/// Persists a finished document.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Store `markdown` under `filename` and return where it ended up.
    async fn persist(&self, filename: &str, markdown: &str) -> Result<String>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}
