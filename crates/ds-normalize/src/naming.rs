use std::collections::BTreeMap;

pub const UNKNOWN_NAME: &str = "unknown";

const NAME_ATTRIBUTES: [&str; 2] = ["data-testid", "data-content-type"];

/// Picks the display name of a node.
///
/// A non-empty `data-testid`, then `data-content-type`, wins over the markup
/// name, with hyphens turned into underscores. Otherwise the lower-cased tag is
/// used, and `unknown` when there is none.
pub fn resolve_name(tag: Option<&str>, attributes: &BTreeMap<String, String>) -> String {
    for key in NAME_ATTRIBUTES {
        if let Some(value) = attributes.get(key).filter(|value| !value.is_empty()) {
            return value.replace('-', "_");
        }
    }

    tag.map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned())
}
