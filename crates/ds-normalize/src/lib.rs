//! Canonical, transport-safe projections of document trees.
//!
//! Input of any accepted shape is adapted into a [`ShapeNode`] first. From there
//! [`canonicalize`] produces the [`CanonicalNode`] form, [`label_tree`] the
//! presentation form, and the [`Normalizer`] ties both to a live host tree.

use ds_analyzer::AnnotatedNode;
use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_core::SharedLogger;
use serde_json::Value;

mod attributes;
mod canonical;
mod labeled;
mod live;
mod naming;
mod shape;

pub use attributes::RawAttributes;
pub use attributes::format_attribute_value;
pub use attributes::normalize_attributes;
pub use canonical::CanonicalNode;
pub use canonical::EMPTY_NAME;
pub use canonical::ERROR_NAME;
pub use canonical::canonicalize;
pub use canonical::normalize;
pub use labeled::LabeledNode;
pub use labeled::label_tree;
pub use live::ElementOutline;
pub use naming::UNKNOWN_NAME;
pub use naming::resolve_name;
pub use shape::ShapeNode;

const COMPONENT: &str = "normalizer";
const DEFAULT_MAX_ATTRIBUTE_LEN: usize = 50;
const MAX_ATTRIBUTE_LEN_LIMIT: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Display budget for attribute values in labeled trees.
    pub max_attribute_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_attribute_len: DEFAULT_MAX_ATTRIBUTE_LEN,
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> DomspyResult<()> {
        if self.max_attribute_len == 0 || self.max_attribute_len > MAX_ATTRIBUTE_LEN_LIMIT {
            return Err(DomspyError::new(
                "config.max_attribute_len_invalid",
                format!(
                    "max attribute length must be in 1..={MAX_ATTRIBUTE_LEN_LIMIT}, got {}",
                    self.max_attribute_len
                ),
            ));
        }

        Ok(())
    }
}

/// Front end over the free normalization functions, carrying config and logger.
pub struct Normalizer {
    config: NormalizerConfig,
    logger: SharedLogger,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig, logger: SharedLogger) -> Self {
        Self { config, logger }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn canonicalize_annotated(&self, node: &AnnotatedNode) -> CanonicalNode {
        canonicalize(Some(&ShapeNode::from_annotated(node)))
    }

    /// Canonicalizes a loosely shaped JSON payload. Anything that is not an
    /// object canonicalizes to the `empty` node.
    pub fn canonicalize_json(&self, value: &Value) -> CanonicalNode {
        let shape = ShapeNode::from_json(value);
        if shape.is_none() {
            self.logger
                .warn(COMPONENT, "payload is not a node object, emitting empty tree");
        }
        canonicalize(shape.as_ref())
    }

    pub fn label_tree(&self, node: Option<&ShapeNode>) -> Option<LabeledNode> {
        label_tree(node, self.config.max_attribute_len)
    }

    pub fn format_attribute_value(&self, value: &str) -> String {
        format_attribute_value(value, self.config.max_attribute_len)
    }
}
