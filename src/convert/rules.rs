//! Ordered conversion rules. The first rule whose filter accepts an element
//! produces its output; the catch-all `default` rule is always last.

use crate::dom::{Document, NodeId};

use super::{code_block, figure, is_block, ExportOptions, Converter};

pub type Filter = fn(&Document, NodeId) -> bool;
pub type Replacement = fn(&Converter<'_>, NodeId, &str) -> String;

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub filter: Filter,
    pub replacement: Replacement,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Custom rules first, then the generic ones. Image suppression is only
    /// present when images are excluded.
    pub fn for_options(options: &ExportOptions) -> Self {
        let mut rules = vec![code_block::RULE, figure::FIGURE_RULE];
        if !options.include_images {
            rules.push(figure::SUPPRESS_IMAGE_RULE);
        }
        rules.extend_from_slice(GENERIC_RULES);
        rules.push(DEFAULT_RULE);
        Self { rules }
    }

    pub fn find(&self, doc: &Document, id: NodeId) -> &Rule {
        self.rules
            .iter()
            .find(|rule| (rule.filter)(doc, id))
            .unwrap_or(&DEFAULT_RULE)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}

const GENERIC_RULES: &[Rule] = &[
    Rule {
        name: "paragraph",
        filter: |doc, id| doc.is_tag(id, "p"),
        replacement: |_, _, content| format!("\n\n{}\n\n", content.trim()),
    },
    Rule {
        name: "lineBreak",
        filter: |doc, id| doc.is_tag(id, "br"),
        replacement: |_, _, _| "\n".to_string(),
    },
    Rule {
        name: "heading",
        filter: |doc, id| heading_level(doc, id).is_some(),
        replacement: heading,
    },
    Rule {
        name: "blockquote",
        filter: |doc, id| doc.is_tag(id, "blockquote"),
        replacement: blockquote,
    },
    Rule {
        name: "list",
        filter: |doc, id| doc.is_tag(id, "ul") || doc.is_tag(id, "ol"),
        replacement: list,
    },
    Rule {
        name: "listItem",
        filter: |doc, id| doc.is_tag(id, "li"),
        replacement: list_item,
    },
    Rule {
        name: "horizontalRule",
        filter: |doc, id| doc.is_tag(id, "hr"),
        replacement: |_, _, _| "\n\n---\n\n".to_string(),
    },
    Rule {
        name: "inlineLink",
        filter: |doc, id| doc.is_tag(id, "a") && doc.attr(id, "href").is_some(),
        replacement: inline_link,
    },
    Rule {
        name: "emphasis",
        filter: |doc, id| doc.is_tag(id, "em") || doc.is_tag(id, "i"),
        replacement: |_, _, content| delimit(content, "*"),
    },
    Rule {
        name: "strong",
        filter: |doc, id| doc.is_tag(id, "strong") || doc.is_tag(id, "b"),
        replacement: |_, _, content| delimit(content, "**"),
    },
    Rule {
        name: "code",
        filter: |doc, id| doc.is_tag(id, "code"),
        replacement: inline_code,
    },
    Rule {
        name: "image",
        filter: |doc, id| doc.is_tag(id, "img"),
        replacement: image,
    },
    Rule {
        name: "remove",
        filter: |doc, id| {
            doc.tag_name(id)
                .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"))
        },
        replacement: |_, _, _| String::new(),
    },
];

const DEFAULT_RULE: Rule = Rule {
    name: "default",
    filter: |_, _| true,
    replacement: |conv, id, content| {
        if is_block(conv.doc(), id) {
            format!("\n\n{}\n\n", content)
        } else {
            content.to_string()
        }
    },
};

fn heading_level(doc: &Document, id: NodeId) -> Option<usize> {
    match doc.tag_name(id)? {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn heading(conv: &Converter<'_>, id: NodeId, content: &str) -> String {
    let text = content.trim().replace('\n', " ");
    if text.is_empty() {
        return String::new();
    }
    let level = heading_level(conv.doc(), id).unwrap_or(1);
    format!("\n\n{} {}\n\n", "#".repeat(level), text)
}

fn blockquote(_: &Converter<'_>, _: NodeId, content: &str) -> String {
    let quoted: Vec<String> = content
        .trim()
        .lines()
        .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
        .collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

fn list(conv: &Converter<'_>, id: NodeId, content: &str) -> String {
    let doc = conv.doc();
    let nested_last = doc.parent(id).is_some_and(|parent| {
        doc.is_tag(parent, "li") && doc.element_children(parent).last() == Some(id)
    });
    if nested_last {
        format!("\n{}", content)
    } else {
        format!("\n\n{}\n\n", content)
    }
}

fn list_item(conv: &Converter<'_>, id: NodeId, content: &str) -> String {
    let doc = conv.doc();
    let content = content.trim_start_matches('\n');
    let trimmed = content.trim_end_matches('\n');
    let mut body = trimmed.to_string();
    if trimmed.len() != content.len() {
        body.push('\n');
    }
    let body = body.replace('\n', "\n    ");

    let prefix = match doc.parent(id) {
        Some(parent) if doc.is_tag(parent, "ol") => {
            let start: usize = doc
                .attr(parent, "start")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1);
            let index = doc
                .element_children(parent)
                .position(|child| child == id)
                .unwrap_or(0);
            format!("{}. ", start + index)
        }
        _ => "- ".to_string(),
    };

    let has_next = doc.parent(id).is_some_and(|parent| {
        doc.element_children(parent)
            .skip_while(|&child| child != id)
            .nth(1)
            .is_some()
    });
    let body = body.trim_end_matches(' ');
    let separator = if has_next && !body.ends_with('\n') { "\n" } else { "" };
    format!("{}{}{}", prefix, body, separator)
}

fn inline_link(conv: &Converter<'_>, id: NodeId, content: &str) -> String {
    let doc = conv.doc();
    let href = doc
        .attr(id, "href")
        .unwrap_or_default()
        .replace('(', "\\(")
        .replace(')', "\\)");
    let title = doc
        .attr(id, "title")
        .filter(|t| !t.is_empty())
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("[{}]({}{})", content, href, title)
}

/// Wraps `content` in `delimiter`, keeping surrounding whitespace outside.
fn delimit(content: &str, delimiter: &str) -> String {
    let inner = content.trim();
    if inner.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{}{}{}{}{}", leading, delimiter, inner, delimiter, trailing)
}

fn inline_code(conv: &Converter<'_>, id: NodeId, _content: &str) -> String {
    let code = conv.doc().text_content(id).replace(['\r', '\n'], " ");
    if code.is_empty() {
        return String::new();
    }

    let runs = backtick_runs(&code);
    let mut width = 1;
    while runs.contains(&width) {
        width += 1;
    }
    let delimiter = "`".repeat(width);
    let pad = if code.starts_with('`') || code.ends_with('`') { " " } else { "" };
    format!("{delimiter}{pad}{code}{pad}{delimiter}")
}

/// Lengths of every maximal run of backticks in `text`.
pub fn backtick_runs(text: &str) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

fn image(conv: &Converter<'_>, id: NodeId, _content: &str) -> String {
    let doc = conv.doc();
    let src = doc.attr(id, "src").unwrap_or_default();
    if src.is_empty() {
        return String::new();
    }
    let alt = doc.attr(id, "alt").unwrap_or_default();
    let title = doc
        .attr(id, "title")
        .filter(|t| !t.is_empty())
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("![{}]({}{})", alt, src, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_puts_custom_rules_first() {
        let with_images = RuleSet::for_options(&ExportOptions::default());
        let names = with_images.names();
        assert_eq!(&names[..2], &["fencedCodeBlock", "figureWithCaption"]);
        assert!(!names.contains(&"removeImages"));
        assert_eq!(names.last(), Some(&"default"));

        let without_images = RuleSet::for_options(&ExportOptions {
            include_frontmatter: true,
            include_images: false,
        });
        assert_eq!(without_images.names()[2], "removeImages");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let doc = Document::parse("<pre><code>x</code></pre><img src=\"a.png\"><span>s</span>");
        let rules = RuleSet::for_options(&ExportOptions {
            include_frontmatter: false,
            include_images: false,
        });
        let pre = doc.find_first(doc.root(), "pre").unwrap();
        let code = doc.find_first(doc.root(), "code").unwrap();
        let img = doc.find_first(doc.root(), "img").unwrap();
        let span = doc.find_first(doc.root(), "span").unwrap();

        assert_eq!(rules.find(&doc, pre).name, "fencedCodeBlock");
        assert_eq!(rules.find(&doc, code).name, "code");
        assert_eq!(rules.find(&doc, img).name, "removeImages");
        assert_eq!(rules.find(&doc, span).name, "default");
    }

    #[test]
    fn test_delimit_moves_whitespace_outside() {
        assert_eq!(delimit(" bold ", "**"), " **bold** ");
        assert_eq!(delimit("  ", "*"), "  ");
    }

    #[test]
    fn test_backtick_runs() {
        assert_eq!(backtick_runs("a``b`c````"), vec![2, 1, 4]);
        assert!(backtick_runs("none").is_empty());
    }
}
