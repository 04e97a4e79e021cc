//! Input adapters.
//!
//! The normalizer accepts the analyzer's annotated tree and loosely shaped
//! JSON payloads (`_children` or `children`, keyed or listed attributes).
//! Both are converted into [`ShapeNode`] before any normalization runs.

use crate::RawAttributes;
use ds_analyzer::AnnotatedNode;
use serde_json::Map;
use serde_json::Value;

/// Common intermediate form of every accepted input shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShapeNode {
    pub tag: Option<String>,
    pub attributes: RawAttributes,
    pub text: Option<String>,
    pub children: Vec<ShapeNode>,
}

impl ShapeNode {
    pub fn from_annotated(node: &AnnotatedNode) -> Self {
        Self {
            tag: Some(node.name.clone()),
            attributes: RawAttributes::Map(node.attributes.clone()),
            text: node.text.clone(),
            children: node.children.iter().map(Self::from_annotated).collect(),
        }
    }

    /// Reads a JSON node; non-object values yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            tag: json_tag(object),
            attributes: RawAttributes::from_json(object.get("attributes")),
            text: object
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_owned),
            children: json_children(object)
                .iter()
                .filter_map(Self::from_json)
                .collect(),
        })
    }
}

fn json_tag(object: &Map<String, Value>) -> Option<String> {
    let direct = ["tag", "tagName"]
        .into_iter()
        .find_map(|key| non_empty_str(object.get(key)));
    let from_element = || {
        let element = object.get("element")?.as_object()?;
        ["tagName", "nodeName"]
            .into_iter()
            .find_map(|key| non_empty_str(element.get(key)))
            .map(|name| name.to_ascii_lowercase())
    };
    direct.or_else(from_element)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// `_children` wins whenever it is a list, even an empty one.
fn json_children(object: &Map<String, Value>) -> &[Value] {
    ["_children", "children"]
        .into_iter()
        .find_map(|key| object.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
