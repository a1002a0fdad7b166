//! Markup-to-Markdown conversion.
//!
//! Conversion is a pure function of the pruned tree and [`ExportOptions`]:
//! every element is handed to the first rule in [`RuleSet`] whose filter
//! accepts it, together with the already converted content of its children.

pub mod code_block;
pub mod figure;
pub mod filename;
pub mod frontmatter;
pub mod postprocess;
pub mod rules;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeData, NodeId};
use crate::extract::ArticleMetadata;

pub use filename::{derive_dated_filename, derive_filename};
pub use frontmatter::build_frontmatter;
pub use postprocess::normalize_whitespace;
pub use rules::{Rule, RuleSet};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("WHITESPACE should compile"));

static MARKDOWN_ESCAPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\${1}"),
        (r"^(#{1,6}) ", r"\${1} "),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
        (r"^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("markdown escape pattern should compile"),
            replacement,
        )
    })
    .collect()
});

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas", "center", "dd", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu", "nav",
    "noframes", "noscript", "ol", "output", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// User-chosen output switches. Re-read on every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub include_frontmatter: bool,
    pub include_images: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: true,
            include_images: true,
        }
    }
}

pub fn is_block(doc: &Document, id: NodeId) -> bool {
    doc.tag_name(id).is_some_and(|name| BLOCK_ELEMENTS.contains(&name))
}

/// Walks a tree and applies a rule set to every element.
pub struct Converter<'a> {
    doc: &'a Document,
    options: ExportOptions,
    rules: RuleSet,
}

impl<'a> Converter<'a> {
    pub fn new(doc: &'a Document, options: ExportOptions) -> Self {
        Self {
            doc,
            options,
            rules: RuleSet::for_options(&options),
        }
    }

    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Converted content of the children of `id`, concatenated.
    pub fn convert_children(&self, id: NodeId) -> String {
        self.doc
            .children(id)
            .iter()
            .map(|&child| self.convert_node(child))
            .collect()
    }

    fn convert_node(&self, id: NodeId) -> String {
        match self.doc.data(id) {
            NodeData::Text(text) => self.convert_text(id, text),
            NodeData::Comment(_) => String::new(),
            NodeData::Document => self.convert_children(id),
            NodeData::Element(_) => {
                let content = self.convert_children(id);
                let rule = self.rules.find(self.doc, id);
                (rule.replacement)(self, id, &content)
            }
        }
    }

    fn convert_text(&self, id: NodeId, text: &str) -> String {
        let in_pre = self.doc.ancestors(id).any(|a| self.doc.is_tag(a, "pre"));
        if in_pre {
            return text.to_string();
        }

        let collapsed = WHITESPACE.replace_all(text, " ");
        let parent_is_block = self.doc.parent(id).is_some_and(|p| is_block(self.doc, p));
        let at_block_start = parent_is_block
            && self.doc.prev_sibling(id).map_or(true, |s| is_block(self.doc, s));
        let at_block_end = parent_is_block
            && self.doc.next_sibling(id).map_or(true, |s| is_block(self.doc, s));

        let mut collapsed: &str = &collapsed;
        if at_block_start {
            collapsed = collapsed.trim_start();
        }
        if at_block_end {
            collapsed = collapsed.trim_end();
        }
        escape_markdown(collapsed)
    }
}

/// Backslash-escapes characters that would otherwise be read as Markdown.
pub fn escape_markdown(text: &str) -> String {
    MARKDOWN_ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// Converts the subtree at `root` to normalized Markdown.
pub fn convert(doc: &Document, root: NodeId, options: &ExportOptions) -> String {
    let converter = Converter::new(doc, *options);
    normalize_whitespace(&converter.convert_children(root))
}

/// Parses serialized article markup and converts its body.
pub fn convert_html(html: &str, options: &ExportOptions) -> String {
    let doc = Document::parse(html);
    let root = doc.find_first(doc.root(), "body").unwrap_or_else(|| doc.root());
    convert(&doc, root, options)
}

/// Assembles the final document: optional header block, title heading, body.
pub fn render_markdown(metadata: &ArticleMetadata, article_html: &str, options: &ExportOptions) -> String {
    let mut out = String::new();
    if options.include_frontmatter {
        out.push_str(&build_frontmatter(metadata));
        out.push_str("\n\n");
    }
    if !metadata.title.is_empty() {
        out.push_str("# ");
        out.push_str(&metadata.title);
        out.push_str("\n\n");
    }
    out.push_str(&convert_html(article_html, options));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(html: &str) -> String {
        convert_html(html, &ExportOptions::default())
    }

    #[test]
    fn test_paragraphs_and_inline_formatting() {
        let out = md("<p>Hello <strong>bold</strong> and <em>soft</em> <a href=\"https://x.dev\">link</a>.</p><p>Second</p>");
        assert_eq!(out, "Hello **bold** and *soft* [link](https://x.dev).\n\nSecond\n");
    }

    #[test]
    fn test_headings_lists_and_quotes() {
        let out = md(
            "<h2>Intro</h2>\n<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>\n<ol start=\"3\"><li>three</li><li>four</li></ol><blockquote><p>quoted</p></blockquote><hr>",
        );
        assert_eq!(
            out,
            "## Intro\n\n- one\n- two\n\n3. three\n4. four\n\n> quoted\n\n---\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let out = md("<p>2 * 3 = _six_ [not a link]</p><p># not a heading</p>");
        assert_eq!(out, "2 \\* 3 = \\_six\\_ \\[not a link\\]\n\n\\# not a heading\n");
    }

    #[test]
    fn test_inline_code_uses_longer_delimiter() {
        assert_eq!(md("<p>Use <code>a`b</code> here</p>"), "Use ``a`b`` here\n");
        assert_eq!(md("<p><code>plain</code></p>"), "`plain`\n");
    }

    #[test]
    fn test_nested_list_is_indented() {
        let out = md("<ul><li>outer<ul><li>inner</li></ul></li><li>next</li></ul>");
        assert_eq!(out, "- outer\n    - inner\n- next\n");
    }

    #[test]
    fn test_scripts_and_comments_dropped() {
        assert_eq!(md("<p>a<!-- c --></p><script>var x = 1;</script><style>p{}</style>"), "a\n");
    }

    #[test]
    fn test_empty_input_yields_single_newline() {
        assert_eq!(md(""), "\n");
    }

    #[test]
    fn test_render_markdown_with_frontmatter() {
        let meta = ArticleMetadata {
            title: "Hello".into(),
            retrieved_date: "2024-03-16".into(),
            ..Default::default()
        };
        let out = render_markdown(&meta, "<p>Body</p>", &ExportOptions::default());
        assert_eq!(
            out,
            "---\ntitle: \"Hello\"\nretrieved: \"2024-03-16\"\n---\n\n# Hello\n\nBody\n"
        );

        let bare = render_markdown(
            &meta,
            "<p>Body</p>",
            &ExportOptions {
                include_frontmatter: false,
                include_images: true,
            },
        );
        assert_eq!(bare, "# Hello\n\nBody\n");
    }
}
