use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::messages::{Request, Response};
use super::{OutputSink, PageSource};
use crate::config::FilenameStyle;
use crate::convert::{render_markdown, ExportOptions};
use crate::error::{Error, Result};
use crate::extract::{ArticleExtractor, ArticleMetadata, ExtractedArticle};

/// Answers requests from a UI or the `serve` loop. Every request gets a
/// response; faults become [`Response::Error`].
pub struct ExportService {
    pages: Arc<dyn PageSource>,
    sink: Arc<dyn OutputSink>,
    extractor: ArticleExtractor,
    options: ExportOptions,
    filename_style: FilenameStyle,
}

impl ExportService {
    pub fn new(pages: Arc<dyn PageSource>, sink: Arc<dyn OutputSink>, extractor: ArticleExtractor) -> Self {
        Self {
            pages,
            sink,
            extractor,
            options: ExportOptions::default(),
            filename_style: FilenameStyle::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_filename_style(mut self, style: FilenameStyle) -> Self {
        self.filename_style = style;
        self
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Extract { source, url } => match self.extract(&source, url).await {
                Ok(article) => article.into(),
                Err(e) => Response::error(format!("Extraction failed: {}", e)),
            },
            Request::Convert {
                metadata,
                article_html,
                options,
            } => {
                let (markdown, filename) =
                    self.render(&metadata, &article_html, options.unwrap_or(self.options));
                Response::ConvertSuccess { markdown, filename }
            }
            Request::Persist { markdown, filename } => {
                match self.sink.persist(&filename, &markdown).await {
                    Ok(location) => Response::PersistSuccess { location },
                    Err(e) => {
                        warn!("{} sink rejected {}: {}", self.sink.name(), filename, e);
                        Response::error(format!("Persist failed: {}", e))
                    }
                }
            }
        }
    }

    /// Loads `source` and runs extraction off the async runtime.
    pub async fn extract(&self, source: &str, url: Option<String>) -> Result<ExtractedArticle> {
        let mut page = self.pages.fetch(source).await?;
        if let Some(url) = url {
            page.url = url;
        }

        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&page))
            .await
            .map_err(|e| Error::ContentExtraction(e.to_string()))?
            .into_result()
    }

    /// Final document and its file name.
    pub fn render(
        &self,
        metadata: &ArticleMetadata,
        article_html: &str,
        options: ExportOptions,
    ) -> (String, String) {
        let markdown = render_markdown(metadata, article_html, &options);
        (markdown, self.filename_style.derive(metadata))
    }

    pub async fn persist(&self, filename: &str, markdown: &str) -> Result<String> {
        self.sink.persist(filename, markdown).await
    }

    /// Reads one JSON request per line and writes one JSON response per line
    /// until the input ends. Returns the number of requests handled.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled = 0;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    debug!("Handling request: {:?}", request_kind(&request));
                    self.handle(request).await
                }
                Err(e) => Response::error(format!("Invalid request: {}", e)),
            };

            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
            handled += 1;
        }

        info!("Input closed after {} requests", handled);
        Ok(handled)
    }
}

fn request_kind(request: &Request) -> &'static str {
    match request {
        Request::Extract { .. } => "extract",
        Request::Convert { .. } => "convert",
        Request::Persist { .. } => "persist",
    }
}
