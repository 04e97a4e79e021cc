//! Attribute shape normalization and display truncation.

use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

const URL_TAIL_CHARS: usize = 20;
const ELLIPSIS: &str = "...";

/// Attribute payloads as they arrive from the different input shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawAttributes {
    #[default]
    Absent,
    /// Already keyed by name.
    Map(BTreeMap<String, String>),
    /// `key=value` strings, values optionally quoted.
    List(Vec<String>),
    /// Anything else; normalizes to nothing.
    Unsupported,
}

impl RawAttributes {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self::Map(pairs.into_iter().collect())
    }

    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Object(map)) => Self::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), scalar_string(value)))
                    .collect(),
            ),
            Some(Value::Array(items)) => Self::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect(),
            ),
            Some(_) => Self::Unsupported,
        }
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Collapses any supported attribute shape into a name-to-value map.
pub fn normalize_attributes(raw: &RawAttributes) -> BTreeMap<String, String> {
    match raw {
        RawAttributes::Map(map) => map.clone(),
        RawAttributes::List(entries) => entries
            .iter()
            .filter_map(|entry| parse_attribute_entry(entry))
            .collect(),
        RawAttributes::Absent | RawAttributes::Unsupported => BTreeMap::new(),
    }
}

fn parse_attribute_entry(entry: &str) -> Option<(String, String)> {
    let (key, value) = match entry.split_once('=') {
        Some((key, value)) => (key, value.trim().trim_matches(&['"', '\''][..])),
        None => (entry, ""),
    };
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_owned(), value.to_owned()))
}

/// Shortens `value` for display when it is longer than `max_len` characters.
///
/// URLs keep their origin and the last path characters; everything else is cut
/// to a prefix followed by `...`.
pub fn format_attribute_value(value: &str, max_len: usize) -> String {
    if value.chars().count() <= max_len {
        return value.to_owned();
    }

    if value.starts_with("http") {
        if let Some(shortened) = shorten_url(value) {
            return shortened;
        }
    }

    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut out = value.chars().take(keep).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

fn shorten_url(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }

    let path = url.path();
    let skip = path.chars().count().saturating_sub(URL_TAIL_CHARS);
    let tail = path.chars().skip(skip).collect::<String>();
    Some(format!("{}/{ELLIPSIS}{tail}", origin.ascii_serialization()))
}
