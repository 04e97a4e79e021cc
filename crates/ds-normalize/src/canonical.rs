use crate::ShapeNode;
use crate::UNKNOWN_NAME;
use crate::normalize_attributes;
use ds_analyzer::COMMENT_NAME;
use ds_analyzer::TEXT_NAME;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

pub const EMPTY_NAME: &str = "empty";
pub const ERROR_NAME: &str = "error";

/// Transport-safe projection of a node: no handles, no statistics, no paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub children: Vec<CanonicalNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CanonicalNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: None,
            children: Vec::new(),
            text: None,
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(tag)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_text(ERROR_NAME, message)
    }

    pub fn is_character_data(&self) -> bool {
        is_character_data_tag(&self.tag)
    }
}

pub(crate) fn is_character_data_tag(tag: &str) -> bool {
    tag == TEXT_NAME || tag == COMMENT_NAME
}

/// Projects one adapted node; blank text and comment leaves yield `None`.
pub fn normalize(node: &ShapeNode) -> Option<CanonicalNode> {
    let tag = node
        .tag
        .clone()
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned());

    if is_character_data_tag(&tag) {
        let raw = node.text.as_deref().unwrap_or_default();
        if raw.trim().is_empty() {
            return None;
        }
        // Comments keep their content verbatim.
        let text = if tag == TEXT_NAME { raw.trim() } else { raw };
        return Some(CanonicalNode::with_text(tag, text));
    }

    Some(CanonicalNode {
        tag,
        attributes: Some(normalize_attributes(&node.attributes)),
        children: node.children.iter().filter_map(normalize).collect(),
        text: node.text.clone(),
    })
}

/// Projects a whole tree; absent or fully dropped input becomes an `empty` node.
pub fn canonicalize(node: Option<&ShapeNode>) -> CanonicalNode {
    node.and_then(normalize)
        .unwrap_or_else(|| CanonicalNode::new(EMPTY_NAME))
}
