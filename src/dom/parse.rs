use select::document::Document as SourceDocument;
use select::node::Node as SourceNode;

use super::{Document, Element, NodeData, NodeId};

impl Document {
    /// Parses HTML text with the HTML5 tree builder. Fragments end up wrapped
    /// in `html`/`head`/`body` the same way a browser would wrap them.
    pub fn parse(html: &str) -> Self {
        let source = SourceDocument::from(html);
        let mut doc = Document::new();
        let root = doc.root();

        let mut top_level = Vec::new();
        let mut index = 0;
        while let Some(node) = source.nth(index) {
            if node.parent().is_none() {
                top_level.push(node);
            }
            index += 1;
        }

        let mut stack: Vec<(SourceNode<'_>, NodeId)> =
            top_level.into_iter().rev().map(|node| (node, root)).collect();
        while let Some((node, parent)) = stack.pop() {
            let Some(data) = convert(&node) else {
                continue;
            };
            let id = doc.append(parent, data);
            let children: Vec<SourceNode<'_>> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, id)));
        }

        doc
    }
}

fn convert(node: &SourceNode<'_>) -> Option<NodeData> {
    if let Some(text) = node.as_text() {
        return Some(NodeData::Text(text.to_string()));
    }
    if let Some(comment) = node.as_comment() {
        return Some(NodeData::Comment(comment.to_string()));
    }
    let name = node.name()?;
    let mut element = Element::new(name);
    for (key, value) in node.attrs() {
        element.set_attr(key, value);
    }
    Some(NodeData::Element(element))
}
