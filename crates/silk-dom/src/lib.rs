//! silk-dom - Retained SVG node tree
//!
//! Arena-based element tree that the drawing engine appends into.
//! Nodes are write-once: geometry is never edited after it is attached,
//! only new nodes are added (or whole subtrees dropped on a full clear).

mod document;
mod node;
mod serialize;
mod tree;

pub use document::SvgDocument;
pub use node::{Attribute, ElementData, ElementKind, Node, NodeData};
pub use serialize::serialize_document;
pub use tree::{DomError, DomResult, SvgTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this id refers to a node
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::NONE
    }
}
