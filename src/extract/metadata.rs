use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::dom::{Document, NodeId};

const ARTICLE_TYPES: &[&str] = &["Article", "NewsArticle", "BlogPosting"];

/// Normalized article metadata. Empty strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub canonical_url: String,
    /// `YYYY-MM-DD` or empty.
    #[serde(default)]
    pub published_date: String,
    /// `YYYY-MM-DD` of the day the extraction ran.
    #[serde(default)]
    pub retrieved_date: String,
}

/// Fills `field` only if it is still empty, so the first source to provide
/// a value wins.
fn fill(field: &mut String, value: Option<&str>) {
    if field.is_empty() {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *field = value.to_string();
        }
    }
}

fn date_prefix(value: &str) -> String {
    value.chars().take(10).collect()
}

/// Resolves metadata from structured data, then meta tags, then the document
/// itself. Never fails; missing data leaves fields empty.
pub fn resolve_metadata(doc: &Document, page_url: &str, retrieved: NaiveDate) -> ArticleMetadata {
    let mut meta = ArticleMetadata {
        retrieved_date: retrieved.format("%Y-%m-%d").to_string(),
        ..Default::default()
    };

    apply_structured_data(doc, &mut meta);
    apply_meta_tags(doc, &mut meta);
    apply_document_fallbacks(doc, page_url, &mut meta);

    meta
}

fn apply_structured_data(doc: &Document, meta: &mut ArticleMetadata) {
    let scripts = doc
        .find_all(doc.root(), &["script"])
        .into_iter()
        .filter(|&script| doc.attr(script, "type") == Some("application/ld+json"));

    for script in scripts {
        let payload = doc.text_content(script);
        let parsed: Value = match serde_json::from_str(&payload) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping malformed structured data payload: {}", e);
                continue;
            }
        };

        let object = match &parsed {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => continue,
            },
            other => other,
        };

        if !declares_article_type(object) {
            continue;
        }

        fill(
            &mut meta.title,
            str_field(object, "headline").or_else(|| str_field(object, "name")),
        );
        fill(&mut meta.author, author_name(object.get("author")));
        fill(&mut meta.canonical_url, str_field(object, "url"));
        let published = str_field(object, "datePublished").map(date_prefix);
        fill(&mut meta.published_date, published.as_deref());
    }
}

fn declares_article_type(object: &Value) -> bool {
    match object.get("@type") {
        Some(Value::String(kind)) => ARTICLE_TYPES.contains(&kind.as_str()),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| ARTICLE_TYPES.contains(&kind)),
        _ => false,
    }
}

/// Non-empty string value of `key`, so an empty field falls through to the next candidate.
fn str_field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn author_name(author: Option<&Value>) -> Option<&str> {
    match author? {
        Value::String(name) => Some(name.as_str()),
        object @ Value::Object(_) => str_field(object, "name"),
        Value::Array(items) => author_name(items.first()),
        _ => None,
    }
}

fn apply_meta_tags(doc: &Document, meta: &mut ArticleMetadata) {
    let metas = doc.find_all(doc.root(), &["meta"]);

    fill(&mut meta.title, meta_content(doc, &metas, "og:title"));
    fill(
        &mut meta.author,
        meta_content(doc, &metas, "author").or_else(|| meta_content(doc, &metas, "article:author")),
    );
    fill(&mut meta.canonical_url, meta_content(doc, &metas, "og:url"));
    let published = meta_content(doc, &metas, "article:published_time").map(date_prefix);
    fill(&mut meta.published_date, published.as_deref());
}

/// Content of the first `meta[property=key]`, falling back to the first
/// `meta[name=key]`.
pub(crate) fn meta_content<'a>(doc: &'a Document, metas: &[NodeId], key: &str) -> Option<&'a str> {
    let lookup = |attr: &str| {
        metas
            .iter()
            .find(|&&m| doc.attr(m, attr) == Some(key))
            .and_then(|&m| doc.attr(m, "content"))
            .filter(|content| !content.is_empty())
    };
    lookup("property").or_else(|| lookup("name"))
}

fn apply_document_fallbacks(doc: &Document, page_url: &str, meta: &mut ArticleMetadata) {
    let title = doc
        .find_first(doc.root(), "title")
        .map(|t| doc.text_content(t).split_whitespace().collect::<Vec<_>>().join(" "));
    fill(&mut meta.title, title.as_deref());

    let canonical = doc
        .find_all(doc.root(), &["link"])
        .into_iter()
        .find(|&link| doc.attr(link, "rel") == Some("canonical"))
        .and_then(|link| doc.attr(link, "href"));
    fill(&mut meta.canonical_url, canonical);
    fill(&mut meta.canonical_url, Some(page_url));
}
