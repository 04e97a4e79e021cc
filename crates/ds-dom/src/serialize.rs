//! HTML serialization of document nodes.

use crate::Document;
use crate::NodeId;
use crate::NodeKind;
use ds_core::DomspyResult;

pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

pub(crate) fn outer_html(doc: &Document, id: NodeId) -> DomspyResult<String> {
    let mut out = String::new();
    write_node(doc, id, &mut out)?;
    Ok(out)
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) -> DomspyResult<()> {
    let node = doc.node(id)?;
    match node.kind {
        NodeKind::Document => {
            for child in &node.children {
                write_node(doc, *child, out)?;
            }
        }
        NodeKind::Doctype => {
            out.push_str("<!DOCTYPE ");
            out.push_str(&node.name);
            out.push('>');
        }
        NodeKind::Element => {
            out.push('<');
            out.push_str(&node.name);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if is_void_element(&node.name) {
                return Ok(());
            }

            for child in &node.children {
                write_node(doc, *child, out)?;
            }
            out.push_str("</");
            out.push_str(&node.name);
            out.push('>');
        }
        NodeKind::Text => {
            let text = node.text.as_deref().unwrap_or_default();
            let raw_parent = node
                .parent
                .and_then(|parent| doc.node(parent).ok())
                .map(|parent| parent.kind == NodeKind::Element && is_raw_text_element(&parent.name))
                .unwrap_or(false);
            if raw_parent {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(node.text.as_deref().unwrap_or_default());
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction => {
            out.push_str("<?");
            out.push_str(&node.name);
            let data = node.text.as_deref().unwrap_or_default();
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
    }

    Ok(())
}

fn escape_into(input: &str, in_attribute: bool, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
