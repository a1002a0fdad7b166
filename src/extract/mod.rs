pub mod metadata;
pub mod pruner;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dom::Document;
use crate::error::{Error, Result};

pub use metadata::{resolve_metadata, ArticleMetadata};
pub use pruner::{has_article_content, prune, PruneReport};

/// A page as delivered by whatever fetched it.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub url: String,
}

impl Page {
    pub fn new(html: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedArticle {
    pub metadata: ArticleMetadata,
    /// Pruned article markup, serialized.
    pub article_html: String,
}

/// Outcome of one extraction. There is no partial success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractResult {
    Success(ExtractedArticle),
    Failure { error: String },
}

impl ExtractResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractResult::Success(_))
    }

    pub fn into_result(self) -> Result<ExtractedArticle> {
        match self {
            ExtractResult::Success(article) => Ok(article),
            ExtractResult::Failure { error } => Err(Error::NotExtractable(error)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    /// Expected `og:site_name` of supported pages.
    pub publisher: String,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            publisher: "Medium".to_string(),
        }
    }
}

/// Detects supported article pages and produces metadata plus pruned markup.
#[derive(Debug, Clone, Default)]
pub struct ArticleExtractor {
    settings: ExtractorSettings,
}

impl ArticleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ExtractorSettings) -> Self {
        Self { settings }
    }

    /// Extracts `page`, stamping today's UTC date as the retrieval date.
    pub fn extract(&self, page: &Page) -> ExtractResult {
        self.extract_on(page, Utc::now().date_naive())
    }

    /// Extracts `page` with an explicit retrieval date. Never panics and
    /// never returns a partial result.
    pub fn extract_on(&self, page: &Page, retrieved: NaiveDate) -> ExtractResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(page, retrieved))) {
            Ok(Ok(article)) => {
                info!(
                    "Extracted \"{}\" ({} bytes of markup)",
                    article.metadata.title,
                    article.article_html.len()
                );
                ExtractResult::Success(article)
            }
            Ok(Err(e)) => {
                warn!("Extraction failed for {}: {}", page.url, e);
                ExtractResult::Failure {
                    error: e.to_string(),
                }
            }
            Err(payload) => {
                let error = panic_message(payload.as_ref());
                warn!("Extraction aborted for {}: {}", page.url, error);
                ExtractResult::Failure { error }
            }
        }
    }

    fn run(&self, page: &Page, retrieved: NaiveDate) -> Result<ExtractedArticle> {
        let doc = Document::parse(&page.html);
        let article = doc.find_first(doc.root(), "article");

        let metas = doc.find_all(doc.root(), &["meta"]);
        let from_publisher = metadata::meta_content(&doc, &metas, "og:site_name")
            .is_some_and(|site| site == self.settings.publisher);

        let unsupported = || {
            Error::NotExtractable(format!(
                "This does not appear to be a {} article page.",
                self.settings.publisher
            ))
        };
        if article.is_none() && !from_publisher {
            return Err(unsupported());
        }
        let Some(article) = article else {
            return Err(unsupported());
        };

        let metadata = resolve_metadata(&doc, &page.url, retrieved);

        let (mut working, root) = doc.clone_subtree(article);
        let report = prune(&mut working, root);
        debug!(
            "Pruned {} nodes in {} rounds from {}",
            report.total(),
            report.rounds,
            page.url
        );

        Ok(ExtractedArticle {
            metadata,
            article_html: working.inner_html(root),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Extraction failed unexpectedly".to_string()
    }
}
