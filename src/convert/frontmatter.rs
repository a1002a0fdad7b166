use crate::extract::ArticleMetadata;

const DELIMITER: &str = "---";

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Header block with one `key: "value"` line per non-empty field, in the
/// order title, author, source, published, retrieved.
pub fn build_frontmatter(metadata: &ArticleMetadata) -> String {
    let fields = [
        ("title", &metadata.title),
        ("author", &metadata.author),
        ("source", &metadata.canonical_url),
        ("published", &metadata.published_date),
        ("retrieved", &metadata.retrieved_date),
    ];

    let mut lines = vec![DELIMITER.to_string()];
    lines.extend(
        fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{}: \"{}\"", key, escape_value(value))),
    );
    lines.push(DELIMITER.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::extract::resolve_metadata;
    use chrono::NaiveDate;

    #[test]
    fn test_only_og_title_omits_missing_fields() {
        let doc = Document::parse(r#"<head><meta property="og:title" content="Hello"></head>"#);
        let mut meta = resolve_metadata(&doc, "", NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        meta.retrieved_date.clear();

        let header = build_frontmatter(&meta);
        assert_eq!(header, "---\ntitle: \"Hello\"\n---");
        assert!(!header.contains("author"));
        assert!(!header.contains("source"));
    }

    #[test]
    fn test_all_fields_in_order() {
        let meta = ArticleMetadata {
            title: "T".into(),
            author: "A".into(),
            canonical_url: "https://medium.com/p/1".into(),
            published_date: "2024-01-02".into(),
            retrieved_date: "2024-03-16".into(),
        };
        assert_eq!(
            build_frontmatter(&meta),
            "---\ntitle: \"T\"\nauthor: \"A\"\nsource: \"https://medium.com/p/1\"\npublished: \"2024-01-02\"\nretrieved: \"2024-03-16\"\n---"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let meta = ArticleMetadata {
            title: r#"Say "hi" C:\path"#.into(),
            ..Default::default()
        };
        assert_eq!(
            build_frontmatter(&meta),
            "---\ntitle: \"Say \\\"hi\\\" C:\\\\path\"\n---"
        );
    }
}
