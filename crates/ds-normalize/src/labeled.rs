//! Labeled tree for tree-view presentation.

use crate::ShapeNode;
use crate::format_attribute_value;
use crate::normalize_attributes;
use crate::resolve_name;
use ds_analyzer::TEXT_NAME;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

const PATH_SEPARATOR: &str = " > ";
const ID_HEX_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledNode {
    pub id: String,
    pub label: String,
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<LabeledNode>,
    pub depth: usize,
    pub path: String,
}

/// Builds the labeled tree; text children are left out and attribute values
/// are shortened to `max_attribute_len` for display.
pub fn label_tree(node: Option<&ShapeNode>, max_attribute_len: usize) -> Option<LabeledNode> {
    node.map(|node| label_node(node, 0, "", "0", max_attribute_len))
}

fn label_node(
    node: &ShapeNode,
    depth: usize,
    parent_path: &str,
    locator: &str,
    max_attribute_len: usize,
) -> LabeledNode {
    let attributes = normalize_attributes(&node.attributes);
    let name = resolve_name(node.tag.as_deref(), &attributes);
    let path = if parent_path.is_empty() {
        name.clone()
    } else {
        format!("{parent_path}{PATH_SEPARATOR}{name}")
    };

    let children = node
        .children
        .iter()
        .filter(|child| {
            let child_attributes = normalize_attributes(&child.attributes);
            resolve_name(child.tag.as_deref(), &child_attributes) != TEXT_NAME
        })
        .enumerate()
        .map(|(index, child)| {
            label_node(
                child,
                depth + 1,
                &path,
                &format!("{locator}.{index}"),
                max_attribute_len,
            )
        })
        .collect();

    LabeledNode {
        id: structural_id(locator, &path),
        label: name.clone(),
        tag_name: name,
        attributes: attributes
            .into_iter()
            .map(|(key, value)| {
                let shown = format_attribute_value(&value, max_attribute_len);
                (key, shown)
            })
            .collect(),
        children,
        depth,
        path,
    }
}

/// Stable id derived from the sibling-index chain and the path.
fn structural_id(locator: &str, path: &str) -> String {
    let hash = blake3::hash(format!("{locator}|{path}").as_bytes());
    hash.to_hex().as_str()[..ID_HEX_CHARS].to_owned()
}

#[cfg(test)]
mod tests {
    use super::LabeledNode;
    use super::label_tree;
    use crate::RawAttributes;
    use crate::ShapeNode;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<ShapeNode>) -> ShapeNode {
        ShapeNode {
            tag: Some(tag.to_owned()),
            attributes: RawAttributes::Map(
                attributes
                    .iter()
                    .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            children,
            ..ShapeNode::default()
        }
    }

    fn text(content: &str) -> ShapeNode {
        ShapeNode {
            tag: Some("#text".to_owned()),
            text: Some(content.to_owned()),
            ..ShapeNode::default()
        }
    }

    fn labeled(shape: &ShapeNode) -> LabeledNode {
        match label_tree(Some(shape), 50) {
            Some(node) => node,
            None => panic!("present input must label"),
        }
    }

    fn ids(node: &LabeledNode, out: &mut Vec<String>) {
        out.push(node.id.clone());
        for child in &node.children {
            ids(child, out);
        }
    }

    #[test]
    fn drops_text_children_and_uses_semantic_names() {
        let shape = element(
            "form",
            &[],
            vec![
                text("Fill in"),
                element("button", &[("data-testid", "save-btn")], vec![text("Save")]),
            ],
        );
        let tree = labeled(&shape);

        assert_eq!(tree.children.len(), 1);
        let button = &tree.children[0];
        assert_eq!(button.label, "save_btn");
        assert_eq!(button.tag_name, "save_btn");
        assert_eq!(button.path, "form > save_btn");
        assert_eq!(button.depth, 1);
        assert!(button.children.is_empty());
    }

    #[test]
    fn ids_are_unique_across_identical_siblings() {
        let shape = element(
            "ul",
            &[],
            vec![
                element("li", &[], Vec::new()),
                element("li", &[], Vec::new()),
                element("li", &[], vec![element("li", &[], Vec::new())]),
            ],
        );
        let tree = labeled(&shape);
        let mut all = Vec::new();
        ids(&tree, &mut all);

        let unique = all.iter().collect::<BTreeSet<_>>();
        assert_eq!(unique.len(), all.len());
        assert!(all.iter().all(|id| id.len() == 16));
        assert_eq!(labeled(&shape), tree);
    }

    #[test]
    fn long_attribute_values_are_shortened_for_display() {
        let long = "x".repeat(80);
        let shape = element("div", &[("title", long.as_str())], Vec::new());
        let tree = labeled(&shape);
        assert_eq!(
            tree.attributes.get("title").map(|value| value.chars().count()),
            Some(50)
        );
    }

    #[test]
    fn absent_input_has_no_tree() {
        assert!(label_tree(None, 50).is_none());
    }
}
