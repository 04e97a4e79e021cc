//! Arena-backed document used by the parser, the CLI and the tests.

use crate::HostTree;
use crate::MarkableTree;
use crate::NodeId;
use crate::NodeKind;
use crate::serialize;
use ds_core::DomspyError;
use ds_core::DomspyResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: Option<String>,
}

impl NodeData {
    fn new(kind: NodeKind, name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            name: name.into(),
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
            text: None,
        }
    }
}

/// Mutable document tree. Node 0 is always the document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document, "#document", None)],
        }
    }

    /// Number of nodes including the document node.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|node| node.parent)
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: Vec<(String, String)>,
    ) -> DomspyResult<NodeId> {
        let mut node = NodeData::new(NodeKind::Element, tag.to_ascii_lowercase(), Some(parent));
        node.attributes = attributes;
        self.attach(parent, node)
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> DomspyResult<NodeId> {
        let mut node = NodeData::new(NodeKind::Text, "#text", Some(parent));
        node.text = Some(text.to_owned());
        self.attach(parent, node)
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> DomspyResult<NodeId> {
        let mut node = NodeData::new(NodeKind::Comment, "#comment", Some(parent));
        node.text = Some(text.to_owned());
        self.attach(parent, node)
    }

    pub fn append_doctype(&mut self, parent: NodeId, name: &str) -> DomspyResult<NodeId> {
        let node = NodeData::new(NodeKind::Doctype, name.to_ascii_lowercase(), Some(parent));
        self.attach(parent, node)
    }

    pub fn append_processing_instruction(
        &mut self,
        parent: NodeId,
        target: &str,
        data: &str,
    ) -> DomspyResult<NodeId> {
        let mut node = NodeData::new(NodeKind::ProcessingInstruction, target, Some(parent));
        node.text = Some(data.to_owned());
        self.attach(parent, node)
    }

    /// All elements with the given tag name, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(NodeId::DOCUMENT, tag, &mut out);
        out
    }

    fn collect_elements(&self, id: NodeId, tag: &str, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(id.index()) else {
            return;
        };
        if node.kind == NodeKind::Element && node.name.eq_ignore_ascii_case(tag) {
            out.push(id);
        }
        for child in &node.children {
            self.collect_elements(*child, tag, out);
        }
    }

    fn attach(&mut self, parent: NodeId, node: NodeData) -> DomspyResult<NodeId> {
        let parent_kind = self.node(parent)?.kind;
        if !matches!(parent_kind, NodeKind::Document | NodeKind::Element) {
            return Err(DomspyError::new(
                "dom.invalid_parent",
                format!(
                    "cannot append a child to {} node {}",
                    parent_kind.as_str(),
                    parent.raw()
                ),
            ));
        }

        let raw = u32::try_from(self.nodes.len()).map_err(|_| {
            DomspyError::new("dom.arena_full", "document exceeds the addressable node count")
        })?;
        let id = NodeId::new(raw);
        self.nodes.push(node);
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> DomspyResult<&NodeData> {
        self.nodes.get(id.index()).ok_or_else(|| missing(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomspyResult<&mut NodeData> {
        self.nodes.get_mut(id.index()).ok_or_else(|| missing(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomspyResult<&mut NodeData> {
        let node = self.node_mut(id)?;
        if node.kind != NodeKind::Element {
            return Err(DomspyError::new(
                "dom.not_an_element",
                format!("node {} is a {} node", id.raw(), node.kind.as_str()),
            ));
        }
        Ok(node)
    }
}

fn missing(id: NodeId) -> DomspyError {
    DomspyError::new(
        "dom.node_missing",
        format!("node {} is not part of this document", id.raw()),
    )
}

impl HostTree for Document {
    fn root(&self) -> Option<NodeId> {
        Some(NodeId::DOCUMENT)
    }

    fn kind(&self, id: NodeId) -> DomspyResult<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    fn node_name(&self, id: NodeId) -> DomspyResult<String> {
        Ok(self.node(id)?.name.clone())
    }

    fn children(&self, id: NodeId) -> DomspyResult<Vec<NodeId>> {
        Ok(self.node(id)?.children.clone())
    }

    fn attributes(&self, id: NodeId) -> DomspyResult<Vec<(String, String)>> {
        Ok(self.node(id)?.attributes.clone())
    }

    fn text(&self, id: NodeId) -> DomspyResult<Option<String>> {
        Ok(self.node(id)?.text.clone())
    }

    fn outer_html_len(&self, id: NodeId) -> Option<usize> {
        let node = self.node(id).ok()?;
        if node.kind != NodeKind::Element {
            return None;
        }
        serialize::outer_html(self, id)
            .ok()
            .map(|markup| markup.chars().count())
    }
}

impl MarkableTree for Document {
    fn add_class(&mut self, id: NodeId, class: &str) -> DomspyResult<()> {
        let node = self.element_mut(id)?;
        let mut classes = class_tokens(&node.attributes);
        if classes.iter().any(|token| token == class) {
            return Ok(());
        }
        classes.push(class.to_owned());
        write_attribute(&mut node.attributes, "class", &classes.join(" "));
        Ok(())
    }

    fn remove_class(&mut self, id: NodeId, class: &str) -> DomspyResult<()> {
        let node = self.element_mut(id)?;
        let mut classes = class_tokens(&node.attributes);
        let before = classes.len();
        classes.retain(|token| token != class);
        if classes.len() == before {
            return Ok(());
        }
        if classes.is_empty() {
            node.attributes.retain(|(key, _)| key != "class");
        } else {
            write_attribute(&mut node.attributes, "class", &classes.join(" "));
        }
        Ok(())
    }

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomspyResult<()> {
        let node = self.element_mut(id)?;
        write_attribute(&mut node.attributes, &name.to_ascii_lowercase(), value);
        Ok(())
    }

    fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomspyResult<()> {
        let node = self.element_mut(id)?;
        node.attributes
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(())
    }

    fn outer_html(&self, id: NodeId) -> DomspyResult<String> {
        serialize::outer_html(self, id)
    }
}

fn class_tokens(attributes: &[(String, String)]) -> Vec<String> {
    attributes
        .iter()
        .find(|(key, _)| key == "class")
        .map(|(_, value)| {
            value
                .split_ascii_whitespace()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

fn write_attribute(attributes: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some((_, existing)) = attributes.iter_mut().find(|(key, _)| key == name) {
        *existing = value.to_owned();
    } else {
        attributes.push((name.to_owned(), value.to_owned()));
    }
}
