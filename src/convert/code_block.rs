//! Fenced code blocks from `pre` elements.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, NodeData, NodeId};

use super::rules::{backtick_runs, Rule};
use super::Converter;

static LANGUAGE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"language-(\w+)").expect("LANGUAGE_CLASS should compile"));

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</div>|</p>").expect("LINE_BREAKS should compile")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAGS should compile"));

const MIN_FENCE: usize = 3;

pub const RULE: Rule = Rule {
    name: "fencedCodeBlock",
    filter: |doc, id| doc.is_tag(id, "pre"),
    replacement: code_block,
};

fn code_block(conv: &Converter<'_>, pre: NodeId, _content: &str) -> String {
    let doc = conv.doc();
    let code_root = doc.find_first(pre, "code").unwrap_or(pre);
    let language = language_hint(doc, code_root)
        .or_else(|| language_hint(doc, pre))
        .unwrap_or_default();

    let mut code = markup_to_text(&doc.inner_html(code_root));
    if !code.contains('\n') && has_line_wrappers(doc, code_root) {
        code = markup_to_text(&wrapped_lines_markup(doc, code_root));
    }

    let fence = "`".repeat(fence_len(&code));
    format!("\n\n{fence}{language}\n{}\n{fence}\n\n", code.trim_end())
}

fn language_hint(doc: &Document, id: NodeId) -> Option<String> {
    let class = doc.attr(id, "class")?;
    LANGUAGE_CLASS
        .captures(class)
        .map(|caps| caps[1].to_string())
}

/// Spans count as line wrappers only when nothing but spans and blank text
/// sits directly under the code root. Highlighting spans mixed with loose
/// text are inline tokens, not lines.
fn has_line_wrappers(doc: &Document, code_root: NodeId) -> bool {
    let mut spans = 0;
    for &child in doc.children(code_root) {
        match doc.data(child) {
            NodeData::Element(_) if doc.is_tag(child, "span") => spans += 1,
            NodeData::Text(text) if text.trim().is_empty() => {}
            NodeData::Comment(_) => {}
            _ => return false,
        }
    }
    spans > 0
}

/// Inner markup of `code_root` with a newline after every direct `span` child.
fn wrapped_lines_markup(doc: &Document, code_root: NodeId) -> String {
    let mut markup = String::new();
    for &child in doc.children(code_root) {
        markup.push_str(&doc.outer_html(child));
        if doc.is_tag(child, "span") {
            markup.push('\n');
        }
    }
    markup
}

/// Turns block boundaries into newlines, strips remaining tags and decodes
/// the standard entities.
pub fn markup_to_text(markup: &str) -> String {
    let broken = LINE_BREAKS.replace_all(markup, "\n");
    let stripped = TAGS.replace_all(&broken, "");
    decode_entities(&stripped)
}

/// `&amp;` is decoded last so `&amp;lt;` survives as `&lt;`.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Three backticks, or one more than the longest run of three or more.
pub fn fence_len(code: &str) -> usize {
    match backtick_runs(code).into_iter().max() {
        Some(longest) if longest >= MIN_FENCE => longest + 1,
        _ => MIN_FENCE,
    }
}
