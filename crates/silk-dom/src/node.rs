//! SVG Node - Compact representation
//!
//! Linked-sibling layout in the style of a browser DOM arena:
//! parent/child/sibling edges are NodeId fields, NONE when absent.

use crate::NodeId;

/// A node in the SVG tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    /// Create a new element node
    pub fn element(kind: ElementKind) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data: NodeData::Element(ElementData::new(kind)),
        }
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data: NodeData::Text(content),
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// The closed set of SVG elements the drawing engine emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Svg,
    Group,
    Defs,
    Path,
    Rect,
    Image,
    Text,
    Anchor,
    ClipPath,
    LinearGradient,
    RadialGradient,
    Pattern,
    Stop,
}

impl ElementKind {
    /// SVG tag name
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Group => "g",
            Self::Defs => "defs",
            Self::Path => "path",
            Self::Rect => "rect",
            Self::Image => "image",
            Self::Text => "text",
            Self::Anchor => "a",
            Self::ClipPath => "clipPath",
            Self::LinearGradient => "linearGradient",
            Self::RadialGradient => "radialGradient",
            Self::Pattern => "pattern",
            Self::Stop => "stop",
        }
    }

    /// Whether this element can parent later drawing output.
    ///
    /// Mirrors the "closest group or svg" walk of the canvas emulation:
    /// only containers accept appended shapes.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Svg | Self::Group)
    }
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Element kind (tag)
    pub kind: ElementKind,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value
    pub fn set_attr(&mut self, name: &str, value: String) {
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                attr.value = value;
                return;
            }
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value,
        });
    }
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
