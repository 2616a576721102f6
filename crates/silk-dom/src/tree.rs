//! SVG Tree (arena-based allocation)

use crate::{ElementKind, Node, NodeData, NodeId};

/// Result type for tree operations
pub type DomResult<T> = Result<T, DomError>;

/// Tree operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found in the arena
    #[error("node not found")]
    NotFound,
    /// Node is not a child of the given parent
    #[error("node is not a child of the given parent")]
    NotAChild,
}

/// Arena-based SVG tree
///
/// Nodes are never freed individually; a detached subtree simply becomes
/// unreachable. The drawing model is append-mostly, so the arena only
/// grows for the life of a document.
#[derive(Debug, Clone, Default)]
pub struct SvgTree {
    nodes: Vec<Node>,
}

impl SvgTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the arena (including detached ones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element node
    pub fn create_element(&mut self, kind: ElementKind) -> NodeId {
        self.alloc(Node::element(kind))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content.to_string()))
    }

    /// Element kind of a node, if it is an element
    pub fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.get(id)?.as_element().map(|e| e.kind)
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.parent)
    }

    /// Get an attribute value on an element
    pub fn get_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute on an element; ignored on text nodes
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: String) {
        if let Some(elem) = self.get_mut(id).and_then(|n| n.as_element_mut()) {
            elem.set_attr(name, value);
        } else {
            tracing::debug!(attr = name, "attribute set on a non-element node");
        }
    }

    /// Append a child to a parent, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        self.detach(child);

        let old_last = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);
        {
            let node = self.get_mut(child).ok_or(DomError::NotFound)?;
            node.parent = parent;
            node.prev_sibling = old_last;
            node.next_sibling = NodeId::NONE;
        }
        if old_last.is_valid() {
            if let Some(prev) = self.get_mut(old_last) {
                prev.next_sibling = child;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = child;
        }
        if let Some(p) = self.get_mut(parent) {
            p.last_child = child;
        }
        Ok(child)
    }

    /// Detach a node from its parent; no-op if already detached
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }
        if next.is_valid() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Remove a child from a specific parent
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(child)
    }

    /// Child ids of a node, in document order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        while cur.is_valid() {
            out.push(cur);
            cur = self.get(cur).map_or(NodeId::NONE, |n| n.next_sibling);
        }
        out
    }

    /// Deep-clone a subtree into this arena, returning the detached copy's root
    pub fn clone_subtree(&mut self, id: NodeId) -> DomResult<NodeId> {
        let data = self.get(id).ok_or(DomError::NotFound)?.data.clone();
        let copy = match data {
            NodeData::Element(elem) => {
                let root = self.create_element(elem.kind);
                if let Some(node) = self.get_mut(root).and_then(|n| n.as_element_mut()) {
                    node.attrs = elem.attrs;
                }
                root
            }
            NodeData::Text(text) => self.alloc(Node::text(text)),
        };
        for child in self.children(id) {
            let child_copy = self.clone_subtree(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Deep-clone a subtree from another arena into this one
    pub fn import_subtree(&mut self, src: &SvgTree, id: NodeId) -> DomResult<NodeId> {
        let data = src.get(id).ok_or(DomError::NotFound)?.data.clone();
        let copy = match data {
            NodeData::Element(elem) => {
                let root = self.create_element(elem.kind);
                if let Some(node) = self.get_mut(root).and_then(|n| n.as_element_mut()) {
                    node.attrs = elem.attrs;
                }
                root
            }
            NodeData::Text(text) => self.alloc(Node::text(text)),
        };
        for child in src.children(id) {
            let child_copy = self.import_subtree(src, child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Walk ancestors (starting at `id` itself) to the nearest container
    /// element (`g` or `svg`). Returns NONE if no container encloses it.
    pub fn closest_container(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while cur.is_valid() {
            if let Some(kind) = self.kind(cur) {
                if kind.is_container() {
                    return cur;
                }
            }
            cur = self.parent(cur);
        }
        NodeId::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_children() {
        let mut tree = SvgTree::new();
        let g = tree.create_element(ElementKind::Group);
        let a = tree.create_element(ElementKind::Rect);
        let b = tree.create_element(ElementKind::Path);

        tree.append_child(g, a).unwrap();
        tree.append_child(g, b).unwrap();

        assert_eq!(tree.children(g), vec![a, b]);
        assert_eq!(tree.parent(a), g);
        assert_eq!(tree.parent(b), g);
    }

    #[test]
    fn test_detach_middle_child() {
        let mut tree = SvgTree::new();
        let g = tree.create_element(ElementKind::Group);
        let a = tree.create_element(ElementKind::Rect);
        let b = tree.create_element(ElementKind::Rect);
        let c = tree.create_element(ElementKind::Rect);
        for id in [a, b, c] {
            tree.append_child(g, id).unwrap();
        }

        tree.detach(b);
        assert_eq!(tree.children(g), vec![a, c]);
        assert!(!tree.parent(b).is_valid());
    }

    #[test]
    fn test_remove_child_not_a_child() {
        let mut tree = SvgTree::new();
        let g1 = tree.create_element(ElementKind::Group);
        let g2 = tree.create_element(ElementKind::Group);
        let a = tree.create_element(ElementKind::Rect);
        tree.append_child(g1, a).unwrap();

        assert_eq!(tree.remove_child(g2, a), Err(DomError::NotAChild));
        assert_eq!(tree.parent(a), g1);
    }

    #[test]
    fn test_reparent_on_append() {
        let mut tree = SvgTree::new();
        let g1 = tree.create_element(ElementKind::Group);
        let g2 = tree.create_element(ElementKind::Group);
        let a = tree.create_element(ElementKind::Path);
        tree.append_child(g1, a).unwrap();
        tree.append_child(g2, a).unwrap();

        assert!(tree.children(g1).is_empty());
        assert_eq!(tree.children(g2), vec![a]);
    }

    #[test]
    fn test_clone_subtree() {
        let mut tree = SvgTree::new();
        let g = tree.create_element(ElementKind::Group);
        let p = tree.create_element(ElementKind::Path);
        tree.set_attr(p, "d", "M 0 0 L 10 10".to_string());
        tree.append_child(g, p).unwrap();

        let copy = tree.clone_subtree(g).unwrap();
        assert_ne!(copy, g);
        let kids = tree.children(copy);
        assert_eq!(kids.len(), 1);
        assert_eq!(tree.get_attr(kids[0], "d"), Some("M 0 0 L 10 10"));
        // the copy is detached
        assert!(!tree.parent(copy).is_valid());
    }

    #[test]
    fn test_closest_container() {
        let mut tree = SvgTree::new();
        let svg = tree.create_element(ElementKind::Svg);
        let g = tree.create_element(ElementKind::Group);
        let p = tree.create_element(ElementKind::Path);
        tree.append_child(svg, g).unwrap();
        tree.append_child(g, p).unwrap();

        assert_eq!(tree.closest_container(p), g);
        assert_eq!(tree.closest_container(g), g);
        assert_eq!(tree.closest_container(svg), svg);
    }
}
