use serde::{Deserialize, Serialize};

use crate::convert::ExportOptions;
use crate::extract::{ArticleMetadata, ExtractedArticle};

/// Requests accepted by [`ExportService`](super::ExportService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Run extraction on a page. `url` overrides the page URL used for
    /// metadata fallbacks, which matters for saved files.
    Extract {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// Render previously extracted markup. Options default to the service's.
    Convert {
        metadata: ArticleMetadata,
        #[serde(rename = "articleHtml")]
        article_html: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ExportOptions>,
    },
    /// Persist output.
    Persist { markdown: String, filename: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    ExtractSuccess {
        metadata: ArticleMetadata,
        #[serde(rename = "articleHtml")]
        article_html: String,
    },
    ConvertSuccess { markdown: String, filename: String },
    PersistSuccess { location: String },
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<ExtractedArticle> for Response {
    fn from(article: ExtractedArticle) -> Self {
        Response::ExtractSuccess {
            metadata: article.metadata,
            article_html: article.article_html,
        }
    }
}
