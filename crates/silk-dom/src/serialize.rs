//! Serialization - tree to SVG text
//!
//! Writes the node tree out as standalone SVG markup. The tree itself is
//! the source of truth; serialization never feeds back into it.

use std::fmt::Write as _;

use crate::{NodeData, NodeId, SvgDocument, SvgTree};

/// Serialize a whole document starting at its `<svg>` root
pub fn serialize_document(doc: &SvgDocument) -> String {
    let mut out = String::new();
    write_node(doc.tree(), doc.root(), &mut out);
    out
}

fn write_node(tree: &SvgTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Element(elem) => {
            let tag = elem.kind.tag_name();
            let _ = write!(out, "<{tag}");
            for attr in &elem.attrs {
                let _ = write!(out, " {}=\"{}\"", attr.name, escape_attr(&attr.value));
            }
            let children = tree.children(id);
            if children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in children {
                    write_node(tree, child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

/// Escape an attribute value for double-quoted output
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape character data
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementKind;

    #[test]
    fn test_serialize_empty_document() {
        let doc = SvgDocument::new(500, 500);
        let svg = serialize_document(&doc);
        assert!(svg.starts_with("<svg version=\"1.1\""));
        assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"500\""));
        assert!(svg.contains("<defs/>"));
        assert!(svg.contains("<g/>"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_escaping() {
        let mut doc = SvgDocument::new(10, 10);
        let text_elem = doc.tree_mut().create_element(ElementKind::Text);
        doc.tree_mut()
            .set_attr(text_elem, "font-family", "\"Times\" & <serif>".to_string());
        let text = doc.tree_mut().create_text("a < b & c");
        doc.tree_mut().append_child(text_elem, text).unwrap();
        let group = doc.content_group();
        doc.tree_mut().append_child(group, text_elem).unwrap();

        let svg = serialize_document(&doc);
        assert!(svg.contains("font-family=\"&quot;Times&quot; &amp; &lt;serif&gt;\""));
        assert!(svg.contains(">a &lt; b &amp; c</text>"));
    }

    #[test]
    fn test_nested_elements() {
        let mut doc = SvgDocument::new(10, 10);
        let group = doc.content_group();
        let inner = doc.tree_mut().create_element(ElementKind::Group);
        let rect = doc.tree_mut().create_element(ElementKind::Rect);
        doc.tree_mut().set_attr(rect, "x", "1".to_string());
        doc.tree_mut().append_child(group, inner).unwrap();
        doc.tree_mut().append_child(inner, rect).unwrap();

        let svg = serialize_document(&doc);
        assert!(svg.contains("<g><g><rect x=\"1\"/></g></g>"));
    }
}
