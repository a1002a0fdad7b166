use super::{Document, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

impl Document {
    /// Markup of the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag_name(id).is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
        for &child in self.children(id) {
            self.write_node(child, raw, &mut out);
        }
        out
    }

    /// Markup of `id` including its own tags.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, false, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, raw_text: bool, out: &mut String) {
        match self.data(id) {
            NodeData::Document => {
                for &child in self.children(id) {
                    self.write_node(child, false, out);
                }
            }
            NodeData::Text(text) if raw_text => out.push_str(text),
            NodeData::Text(text) => escape_text(text, out),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for (key, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    return;
                }

                let raw = RAW_TEXT_ELEMENTS.contains(&element.name.as_str());
                for &child in self.children(id) {
                    self.write_node(child, raw, out);
                }

                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_html_escapes_text_and_attributes() {
        let doc = Document::parse(r#"<div title="a &quot;b&quot;"><p>1 &lt; 2 &amp; 3</p><br></div>"#);
        let div = doc.find_first(doc.root(), "div").unwrap();
        assert_eq!(doc.inner_html(div), "<p>1 &lt; 2 &amp; 3</p><br>");
        assert_eq!(
            doc.outer_html(div),
            r#"<div title="a &quot;b&quot;"><p>1 &lt; 2 &amp; 3</p><br></div>"#
        );
    }

    #[test]
    fn test_serialize_then_parse_preserves_text() {
        let doc = Document::parse("<pre><code>if a &lt; b {\n    x &amp;= 1;\n}</code></pre>");
        let pre = doc.find_first(doc.root(), "pre").unwrap();
        let again = Document::parse(&doc.outer_html(pre));
        let code = again.find_first(again.root(), "code").unwrap();
        assert_eq!(again.text_content(code), "if a < b {\n    x &= 1;\n}");
    }
}
