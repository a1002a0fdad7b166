//! Captioned figures and image suppression.

use crate::dom::{Document, NodeId};

use super::rules::Rule;
use super::Converter;

pub const FIGURE_RULE: Rule = Rule {
    name: "figureWithCaption",
    filter: |doc, id| doc.is_tag(id, "figure"),
    replacement: figure,
};

/// Only installed when images are excluded.
pub const SUPPRESS_IMAGE_RULE: Rule = Rule {
    name: "removeImages",
    filter: |doc, id| doc.is_tag(id, "img"),
    replacement: |_, _, _| String::new(),
};

fn figure(conv: &Converter<'_>, id: NodeId, _content: &str) -> String {
    let doc = conv.doc();
    let caption = figure_caption(doc, id);

    if conv.options().include_images {
        if let Some(src) = resolve_image_source(doc, id) {
            let alt = doc
                .find_first(id, "img")
                .and_then(|img| doc.attr(img, "alt"))
                .unwrap_or_default();
            let mut out = format!("\n\n![{}]({})", alt, src);
            if let Some(caption) = &caption {
                out.push_str(&format!("\n*{}*", caption));
            }
            out.push_str("\n\n");
            return out;
        }
    }

    match caption {
        Some(caption) => format!("\n\n*{}*\n\n", caption),
        None => String::new(),
    }
}

fn is_placeholder(src: &str) -> bool {
    src.is_empty() || src.starts_with("data:")
}

/// URL of the last candidate in a `srcset` list.
fn last_srcset_entry(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .last()
}

/// Resolves the image URL of a figure: `src`, then `data-src`, then the
/// image's `srcset`, then the first `picture > source[srcset]`. A value that
/// is still empty or a `data:` placeholder at the end is unresolved.
pub fn resolve_image_source(doc: &Document, figure: NodeId) -> Option<String> {
    let img = doc.find_first(figure, "img");
    let non_empty = |name: &str| {
        img.and_then(|img| doc.attr(img, name))
            .filter(|value| !value.trim().is_empty())
    };

    let mut src = non_empty("src")
        .or_else(|| non_empty("data-src"))
        .unwrap_or_default();

    if is_placeholder(src) {
        if let Some(candidate) = non_empty("srcset").and_then(last_srcset_entry) {
            src = candidate;
        }
    }

    if is_placeholder(src) {
        let picture_source = doc
            .find_all(figure, &["source"])
            .into_iter()
            .filter(|&source| doc.parent(source).is_some_and(|p| doc.is_tag(p, "picture")))
            .find_map(|source| doc.attr(source, "srcset").filter(|s| !s.trim().is_empty()));
        if let Some(candidate) = picture_source.and_then(last_srcset_entry) {
            src = candidate;
        }
    }

    let src = src.trim();
    (!is_placeholder(src)).then(|| src.to_string())
}

/// `figcaption` text with whitespace collapsed, or `None` when empty.
pub fn figure_caption(doc: &Document, figure: NodeId) -> Option<String> {
    let caption = doc.find_first(figure, "figcaption")?;
    let text = doc
        .text_content(caption)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}
