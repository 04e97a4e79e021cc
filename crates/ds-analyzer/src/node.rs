//! Annotated shadow tree produced by the analyzer.

use ds_dom::NodeId;
use ds_dom::NodeKind;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DOCUMENT_NAME: &str = "#document";
pub const DOCTYPE_NAME: &str = "<!DOCTYPE>";
pub const TEXT_NAME: &str = "#text";
pub const COMMENT_NAME: &str = "#comment";

/// One node of the annotated tree with its structural statistics.
///
/// Field names on the wire follow the analyzer payload consumed by the
/// normalizer (`tagName`, `nodes`, `_children`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedNode {
    pub kind: NodeKind,
    #[serde(rename = "tagName")]
    pub name: String,
    pub path: String,
    pub depth: usize,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(rename = "nodes")]
    pub subtree_node_count: usize,
    #[serde(default)]
    pub serialized_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<NodeId>,
    #[serde(rename = "_children", default)]
    pub children: Vec<AnnotatedNode>,
}

impl AnnotatedNode {
    /// Result for an absent root: a bare document with no children.
    pub fn empty_document() -> Self {
        Self::leaf(NodeKind::Document, DOCUMENT_NAME, DOCUMENT_NAME.to_owned(), 0)
    }

    pub(crate) fn leaf(kind: NodeKind, name: &str, path: String, depth: usize) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            path,
            depth,
            attributes: BTreeMap::new(),
            subtree_node_count: 1,
            serialized_length: 0,
            text: None,
            handle: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Deepest `depth` found in this subtree.
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(Self::max_depth)
            .max()
            .unwrap_or(self.depth)
            .max(self.depth)
    }

    /// Pre-order walk over this node and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a AnnotatedNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a AnnotatedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
