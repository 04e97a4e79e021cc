use crate::AnnotatedNode;
use serde::Deserialize;
use serde::Serialize;

/// Key used to reorder siblings, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankOrder {
    #[default]
    #[serde(rename = "nodes", alias = "by-subtree-size")]
    BySubtreeSize,
    #[serde(rename = "depth", alias = "by-depth")]
    ByDepth,
    #[serde(rename = "length", alias = "by-serialized-length")]
    BySerializedLength,
}

impl RankOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BySubtreeSize => "nodes",
            Self::ByDepth => "depth",
            Self::BySerializedLength => "length",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "nodes" | "by-subtree-size" => Some(Self::BySubtreeSize),
            "depth" | "by-depth" => Some(Self::ByDepth),
            "length" | "by-serialized-length" => Some(Self::BySerializedLength),
            _ => None,
        }
    }

    fn key(self, node: &AnnotatedNode) -> usize {
        match self {
            Self::BySubtreeSize => node.subtree_node_count,
            // Siblings share a depth, so this keeps encounter order.
            Self::ByDepth => node.depth,
            Self::BySerializedLength => node.serialized_length,
        }
    }
}

/// Sorts every child list in place by `order`, descending.
///
/// The sort is stable: siblings with equal keys keep encounter order.
pub fn rank(node: &mut AnnotatedNode, order: RankOrder) {
    node.children
        .sort_by(|left, right| order.key(right).cmp(&order.key(left)));
    for child in &mut node.children {
        rank(child, order);
    }
}
