//! DOM tree data structures and the host contracts the inspectors consume.

use ds_core::DomspyResult;
use serde::Deserialize;
use serde::Serialize;

mod document;
mod serialize;

pub use document::Document;
pub use serialize::is_raw_text_element;
pub use serialize::is_void_element;

/// Opaque handle addressing a node in a host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Handle of the document node in a [`Document`] arena.
    pub const DOCUMENT: Self = Self(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Discriminant of a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
    ProcessingInstruction,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Doctype => "doctype",
            Self::Element => "element",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::ProcessingInstruction => "processingInstruction",
        }
    }
}

/// Read-only view of a live document tree.
///
/// Per-node accessors are fallible so that a single broken node can be reported
/// without poisoning the rest of a traversal.
pub trait HostTree {
    /// The document node, if the tree has one.
    fn root(&self) -> Option<NodeId>;

    fn kind(&self, id: NodeId) -> DomspyResult<NodeKind>;

    /// DOM-style node name: the tag name for elements, `#text`, `#comment`,
    /// `#document`, the doctype name, or the processing instruction target.
    fn node_name(&self, id: NodeId) -> DomspyResult<String>;

    fn children(&self, id: NodeId) -> DomspyResult<Vec<NodeId>>;

    /// Attributes in source order. Empty for non-elements.
    fn attributes(&self, id: NodeId) -> DomspyResult<Vec<(String, String)>>;

    /// Character data of text, comment and processing instruction nodes.
    fn text(&self, id: NodeId) -> DomspyResult<Option<String>>;

    /// Length of the serialized markup of an element, `None` for other kinds.
    fn outer_html_len(&self, id: NodeId) -> Option<usize>;

    fn attribute(&self, id: NodeId, name: &str) -> DomspyResult<Option<String>> {
        Ok(self
            .attributes(id)?
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value))
    }

    fn doctype(&self) -> Option<NodeId> {
        let root = self.root()?;
        self.children(root)
            .ok()?
            .into_iter()
            .find(|child| matches!(self.kind(*child), Ok(NodeKind::Doctype)))
    }

    fn document_element(&self) -> Option<NodeId> {
        let root = self.root()?;
        self.children(root)
            .ok()?
            .into_iter()
            .find(|child| matches!(self.kind(*child), Ok(NodeKind::Element)))
    }

    fn head(&self) -> Option<NodeId> {
        find_child_element(self, self.document_element()?, "head")
    }

    fn body(&self) -> Option<NodeId> {
        find_child_element(self, self.document_element()?, "body")
    }
}

/// Host tree whose elements can carry reversible visual marks.
pub trait MarkableTree: HostTree {
    fn add_class(&mut self, id: NodeId, class: &str) -> DomspyResult<()>;

    fn remove_class(&mut self, id: NodeId, class: &str) -> DomspyResult<()>;

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomspyResult<()>;

    fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomspyResult<()>;

    fn outer_html(&self, id: NodeId) -> DomspyResult<String>;

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_name(id)
            .map(|value| value.split_ascii_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    /// Upper-case tag name, as DOM `tagName` reports it for HTML elements.
    fn tag_name(&self, id: NodeId) -> DomspyResult<String> {
        Ok(self.node_name(id)?.to_ascii_uppercase())
    }

    fn element_id(&self, id: NodeId) -> DomspyResult<String> {
        Ok(self.attribute(id, "id")?.unwrap_or_default())
    }

    fn class_name(&self, id: NodeId) -> DomspyResult<String> {
        Ok(self.attribute(id, "class")?.unwrap_or_default())
    }
}

fn find_child_element<T: HostTree + ?Sized>(tree: &T, parent: NodeId, tag: &str) -> Option<NodeId> {
    tree.children(parent).ok()?.into_iter().find(|child| {
        matches!(tree.kind(*child), Ok(NodeKind::Element))
            && tree
                .node_name(*child)
                .map(|name| name.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
    })
}
