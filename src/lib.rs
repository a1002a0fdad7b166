pub mod cli;
pub mod config;
pub mod convert;
pub mod dom;
pub mod error;
pub mod extract;
pub mod transport;

pub use config::Config;
pub use convert::{convert, convert_html, render_markdown, ExportOptions};
pub use error::{Error, Result};
pub use extract::{ArticleExtractor, ArticleMetadata, ExtractResult, ExtractedArticle, Page};
