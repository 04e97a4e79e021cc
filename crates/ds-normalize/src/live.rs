//! Canonical projection straight from a live host tree.

use crate::CanonicalNode;
use crate::Normalizer;
use ds_analyzer::COMMENT_NAME;
use ds_analyzer::DOCUMENT_NAME;
use ds_analyzer::TEXT_NAME;
use ds_core::DomspyResult;
use ds_dom::HostTree;
use ds_dom::NodeId;
use ds_dom::NodeKind;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

const COMPONENT: &str = "normalizer";

/// Element-only outline of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementOutline {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementOutline>,
}

impl Normalizer {
    /// Walks the whole host document and emits canonical nodes directly.
    ///
    /// A node that cannot be read is replaced by an `error` leaf; its siblings
    /// are still visited.
    pub fn analyze_dom<T: HostTree + ?Sized>(&self, tree: &T) -> CanonicalNode {
        let mut root = CanonicalNode::new(DOCUMENT_NAME);
        if tree.root().is_none() {
            self.logger
                .error(COMPONENT, "host tree has no document node");
            root.children
                .push(CanonicalNode::error("failed to analyze document"));
            return root;
        }

        if let Some(doctype) = tree.doctype() {
            let name = tree
                .node_name(doctype)
                .ok()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "html".to_owned());
            root.children
                .push(CanonicalNode::new(format!("<!DOCTYPE {name}>")));
        }

        if let Some(element) = tree.document_element() {
            root.children.extend(self.analyze_node(tree, element));
        }

        self.logger.debug(
            COMPONENT,
            &format!(
                "live traversal complete: {} top-level nodes",
                root.children.len()
            ),
        );
        root
    }

    /// Projects one live node, or `None` when it is blank or of a pruned kind.
    pub fn analyze_node<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
    ) -> Option<CanonicalNode> {
        match self.try_analyze_node(tree, id) {
            Ok(node) => node,
            Err(error) => {
                self.logger.error(
                    COMPONENT,
                    &format!("failed to analyze node {}: {error}", id.raw()),
                );
                Some(CanonicalNode::error(format!(
                    "failed to analyze node: {}",
                    error.message
                )))
            }
        }
    }

    fn try_analyze_node<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
    ) -> DomspyResult<Option<CanonicalNode>> {
        let kind = tree.kind(id)?;
        let tag = match kind {
            NodeKind::Text => TEXT_NAME,
            NodeKind::Comment => COMMENT_NAME,
            NodeKind::Element => return self.analyze_element(tree, id).map(Some),
            NodeKind::Document | NodeKind::Doctype | NodeKind::ProcessingInstruction => {
                return Ok(None);
            }
        };

        let text = tree.text(id)?.unwrap_or_default();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(CanonicalNode::with_text(tag, trimmed)))
    }

    fn analyze_element<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
    ) -> DomspyResult<CanonicalNode> {
        let tag = tree.node_name(id)?.to_ascii_lowercase();
        let attributes = tree
            .attributes(id)?
            .into_iter()
            .collect::<BTreeMap<_, _>>();
        let children = tree
            .children(id)?
            .into_iter()
            .filter_map(|child| self.analyze_node(tree, child))
            .collect();

        Ok(CanonicalNode {
            tag,
            attributes: (!attributes.is_empty()).then_some(attributes),
            children,
            text: None,
        })
    }

    /// Outline of the element tree under the document element.
    pub fn outline_elements<T: HostTree + ?Sized>(&self, tree: &T) -> Option<ElementOutline> {
        let root = tree.document_element()?;
        match self.outline_node(tree, root) {
            Ok(outline) => Some(outline),
            Err(error) => {
                self.logger
                    .error(COMPONENT, &format!("failed to outline document: {error}"));
                None
            }
        }
    }

    fn outline_node<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
    ) -> DomspyResult<ElementOutline> {
        let children = tree.children(id)?;
        let text = match children.as_slice() {
            [only] if tree.kind(*only)? == NodeKind::Text => tree
                .text(*only)?
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
            _ => None,
        };

        let mut outline = ElementOutline {
            tag: tree.node_name(id)?.to_ascii_lowercase(),
            id: tree.attribute(id, "id")?.filter(|value| !value.is_empty()),
            classes: tree
                .attribute(id, "class")?
                .map(|value| value.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|value| !value.is_empty()),
            text,
            children: Vec::new(),
        };

        for child in children {
            if !matches!(tree.kind(child), Ok(NodeKind::Element)) {
                continue;
            }
            match self.outline_node(tree, child) {
                Ok(node) => outline.children.push(node),
                Err(error) => self.logger.warn(
                    COMPONENT,
                    &format!("skipped element {} in outline: {error}", child.raw()),
                ),
            }
        }

        Ok(outline)
    }
}
