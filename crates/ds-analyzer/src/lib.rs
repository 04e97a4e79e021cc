//! Structural analysis of host document trees.
//!
//! [`TreeAnalyzer::analyze`] walks a host tree once, depth first, and returns an
//! [`AnnotatedNode`] shadow tree in which every node knows its depth, its
//! ancestor path and the size of its subtree. Child lists are then ranked by a
//! [`RankOrder`].

use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_core::SharedLogger;
use ds_dom::HostTree;
use ds_dom::NodeId;
use ds_dom::NodeKind;
use std::collections::BTreeMap;

mod node;
mod rank;

pub use node::AnnotatedNode;
pub use node::COMMENT_NAME;
pub use node::DOCTYPE_NAME;
pub use node::DOCUMENT_NAME;
pub use node::Descendants;
pub use node::TEXT_NAME;
pub use rank::RankOrder;
pub use rank::rank;

const COMPONENT: &str = "analyzer";
const DEFAULT_PATH_SEPARATOR: &str = " > ";

/// Analyzer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub order: RankOrder,
    pub path_separator: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            order: RankOrder::default(),
            path_separator: DEFAULT_PATH_SEPARATOR.to_owned(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> DomspyResult<()> {
        if self.path_separator.is_empty() {
            return Err(DomspyError::new(
                "config.path_separator_empty",
                "path separator must not be empty",
            ));
        }

        Ok(())
    }
}

/// Builds annotated shadow trees on demand.
pub struct TreeAnalyzer {
    config: AnalyzerConfig,
    logger: SharedLogger,
}

impl TreeAnalyzer {
    pub fn new(config: AnalyzerConfig, logger: SharedLogger) -> Self {
        Self { config, logger }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes the subtree at `root` using the configured order.
    pub fn analyze<T: HostTree + ?Sized>(&self, tree: &T, root: Option<NodeId>) -> AnnotatedNode {
        self.analyze_with_order(tree, root, self.config.order)
    }

    /// Analyzes the subtree at `root` and ranks it by `order`.
    ///
    /// An absent root, or a root that is itself pruned, yields
    /// [`AnnotatedNode::empty_document`].
    pub fn analyze_with_order<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        root: Option<NodeId>,
        order: RankOrder,
    ) -> AnnotatedNode {
        let Some(root) = root else {
            self.logger
                .debug(COMPONENT, "no root supplied, returning empty document");
            return AnnotatedNode::empty_document();
        };

        let mut analysis = match self.visit(tree, root, 0, "") {
            Some(node) => node,
            None => {
                self.logger.warn(
                    COMPONENT,
                    &format!("root node {} produced no output", root.raw()),
                );
                return AnnotatedNode::empty_document();
            }
        };

        rank(&mut analysis, order);
        self.logger.info(
            COMPONENT,
            &format!(
                "analysis complete: {} nodes, max depth {}, order {}",
                analysis.subtree_node_count,
                analysis.max_depth(),
                order.as_str()
            ),
        );
        analysis
    }

    fn visit<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
        depth: usize,
        parent_path: &str,
    ) -> Option<AnnotatedNode> {
        let kind = match tree.kind(id) {
            Ok(kind) => kind,
            Err(error) => {
                self.prune(id, &error);
                return None;
            }
        };

        match kind {
            NodeKind::Document => self.visit_document(tree, id, depth, parent_path),
            NodeKind::Element => self.visit_element(tree, id, depth, parent_path),
            NodeKind::Text => {
                let text = self.read_text(tree, id)?;
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let mut node = self.leaf(NodeKind::Text, TEXT_NAME, id, depth, parent_path);
                node.text = Some(trimmed.to_owned());
                Some(node)
            }
            NodeKind::Comment => {
                let text = self.read_text(tree, id)?;
                let mut node = self.leaf(NodeKind::Comment, COMMENT_NAME, id, depth, parent_path);
                node.text = Some(text);
                Some(node)
            }
            NodeKind::Doctype => Some(self.leaf(
                NodeKind::Doctype,
                DOCTYPE_NAME,
                id,
                depth,
                parent_path,
            )),
            NodeKind::ProcessingInstruction => None,
        }
    }

    fn read_text<T: HostTree + ?Sized>(&self, tree: &T, id: NodeId) -> Option<String> {
        match tree.text(id) {
            Ok(text) => Some(text.unwrap_or_default()),
            Err(error) => {
                self.prune(id, &error);
                None
            }
        }
    }

    fn visit_document<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
        depth: usize,
        parent_path: &str,
    ) -> Option<AnnotatedNode> {
        let mut node = self.leaf(NodeKind::Document, DOCUMENT_NAME, id, depth, parent_path);
        let doctype = tree.doctype();
        if let Some(doctype) = doctype {
            node.children.extend(self.visit(tree, doctype, depth + 1, &node.path));
        }

        let children = match tree.children(id) {
            Ok(children) => children,
            Err(error) => {
                self.prune(id, &error);
                return None;
            }
        };
        for child in children {
            if Some(child) == doctype {
                continue;
            }
            node.children
                .extend(self.visit(tree, child, depth + 1, &node.path));
        }

        node.subtree_node_count = 1 + count_children(&node.children);
        Some(node)
    }

    fn visit_element<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        id: NodeId,
        depth: usize,
        parent_path: &str,
    ) -> Option<AnnotatedNode> {
        let name = match tree.node_name(id) {
            Ok(name) => name.to_ascii_lowercase(),
            Err(error) => {
                self.prune(id, &error);
                return None;
            }
        };
        let (attributes, children) = match tree.attributes(id).and_then(|attributes| {
            tree.children(id)
                .map(|children| (attributes, children))
        }) {
            Ok(parts) => parts,
            Err(error) => {
                self.prune(id, &error);
                return None;
            }
        };

        let mut node = self.leaf(NodeKind::Element, &name, id, depth, parent_path);
        node.attributes = attributes.into_iter().collect::<BTreeMap<_, _>>();
        node.serialized_length = tree.outer_html_len(id).unwrap_or(0);
        for child in children {
            node.children
                .extend(self.visit(tree, child, depth + 1, &node.path));
        }
        node.subtree_node_count = 1 + count_children(&node.children);
        Some(node)
    }

    fn leaf(
        &self,
        kind: NodeKind,
        name: &str,
        id: NodeId,
        depth: usize,
        parent_path: &str,
    ) -> AnnotatedNode {
        let path = if parent_path.is_empty() {
            name.to_owned()
        } else {
            format!("{parent_path}{}{name}", self.config.path_separator)
        };
        let mut node = AnnotatedNode::leaf(kind, name, path, depth);
        node.handle = Some(id);
        node
    }

    fn prune(&self, id: NodeId, error: &DomspyError) {
        self.logger
            .warn(COMPONENT, &format!("pruned node {}: {error}", id.raw()));
    }
}

fn count_children(children: &[AnnotatedNode]) -> usize {
    children.iter().map(|child| child.subtree_node_count).sum()
}

#[cfg(test)]
mod tests;
