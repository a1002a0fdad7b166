use crate::extract::ArticleMetadata;

const UNTITLED: &str = "Untitled";
const MAX_SLUG_CHARS: usize = 80;

/// `<title>.md` with characters illegal in file names removed.
pub fn derive_filename(metadata: &ArticleMetadata) -> String {
    let sanitized = sanitize_filename::sanitize(&metadata.title);
    let stem = match sanitized.trim() {
        "" => UNTITLED,
        stem => stem,
    };
    format!("{}.md", stem)
}

/// `YYYY-MM-DD - <slug>.md`, dated by the published day when known, else
/// the retrieval day. Sorts chronologically in a directory listing.
pub fn derive_dated_filename(metadata: &ArticleMetadata) -> String {
    let date = if metadata.published_date.is_empty() {
        &metadata.retrieved_date
    } else {
        &metadata.published_date
    };
    let slug = slugify(&metadata.title);
    let slug = if slug.is_empty() { UNTITLED.to_lowercase() } else { slug };

    if date.is_empty() {
        format!("{}.md", slug)
    } else {
        format!("{} - {}.md", date, slug)
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_CHARS).collect();
    slug.trim_end_matches('-').to_string()
}
