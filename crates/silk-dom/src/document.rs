//! Document - root SVG structure
//!
//! Owns the arena plus the three anchor nodes every document has: the
//! `<svg>` root, the shared `<defs>` collection, and the content `<g>` that
//! drawing output nests under (the root itself cannot carry a transform
//! attribute, so content always lives in a group).

use crate::{ElementKind, NodeId, SvgTree};

/// SVG document
#[derive(Debug)]
pub struct SvgDocument {
    /// The node arena
    tree: SvgTree,
    /// Surface width in pixels
    width: u32,
    /// Surface height in pixels
    height: u32,
    /// The `<svg>` root
    root: NodeId,
    /// The `<defs>` child holding gradients/patterns/clip paths
    defs: NodeId,
    /// The current content group (replaced wholesale on a full clear)
    content: NodeId,
}

impl SvgDocument {
    /// Create a new document with the standard root markup
    pub fn new(width: u32, height: u32) -> Self {
        let mut tree = SvgTree::new();
        let root = tree.create_element(ElementKind::Svg);
        tree.set_attr(root, "version", "1.1".to_string());
        tree.set_attr(root, "xmlns", "http://www.w3.org/2000/svg".to_string());
        tree.set_attr(
            root,
            "xmlns:xlink",
            "http://www.w3.org/1999/xlink".to_string(),
        );
        tree.set_attr(root, "width", width.to_string());
        tree.set_attr(root, "height", height.to_string());

        let defs = tree.create_element(ElementKind::Defs);
        tree.append_child(root, defs).expect("defs under fresh root");

        let content = tree.create_element(ElementKind::Group);
        tree.append_child(root, content)
            .expect("content group under fresh root");

        Self {
            tree,
            width,
            height,
            root,
            defs,
            content,
        }
    }

    /// Surface width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The `<svg>` root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The shared definitions collection
    pub fn defs(&self) -> NodeId {
        self.defs
    }

    /// The current content group
    pub fn content_group(&self) -> NodeId {
        self.content
    }

    /// Access the node arena
    pub fn tree(&self) -> &SvgTree {
        &self.tree
    }

    /// Access the node arena mutably
    pub fn tree_mut(&mut self) -> &mut SvgTree {
        &mut self.tree
    }

    /// Drop the entire content subtree and start over with one empty group.
    ///
    /// Used by the full-surface clear: every previously drawn node becomes
    /// unreachable, defs are kept. Returns the fresh group.
    pub fn replace_content_group(&mut self) -> NodeId {
        self.tree.detach(self.content);
        let fresh = self.tree.create_element(ElementKind::Group);
        self.tree
            .append_child(self.root, fresh)
            .expect("fresh content group under root");
        self.content = fresh;
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let doc = SvgDocument::new(500, 300);
        assert_eq!(doc.tree().get_attr(doc.root(), "width"), Some("500"));
        assert_eq!(doc.tree().get_attr(doc.root(), "height"), Some("300"));
        assert_eq!(doc.tree().get_attr(doc.root(), "version"), Some("1.1"));
        assert_eq!(
            doc.tree().children(doc.root()),
            vec![doc.defs(), doc.content_group()]
        );
        assert_eq!(doc.tree().kind(doc.defs()), Some(ElementKind::Defs));
        assert_eq!(
            doc.tree().kind(doc.content_group()),
            Some(ElementKind::Group)
        );
    }

    #[test]
    fn test_replace_content_group() {
        let mut doc = SvgDocument::new(100, 100);
        let old = doc.content_group();
        let shape = doc.tree_mut().create_element(ElementKind::Rect);
        doc.tree_mut().append_child(old, shape).unwrap();

        let fresh = doc.replace_content_group();
        assert_ne!(fresh, old);
        assert_eq!(doc.content_group(), fresh);
        assert!(doc.tree().children(fresh).is_empty());
        // old subtree is unreachable from the root
        assert_eq!(doc.tree().children(doc.root()), vec![doc.defs(), fresh]);
    }
}
