//! Declarative frontmatter reader.
//!
//! Reads `---` blocks written in a small YAML subset (scalars, quoted strings,
//! booleans, inline and block lists, folded/literal scalars, one level of nested
//! maps) and `+++` blocks written in TOML. Values are only ever read as data;
//! nothing from a document is evaluated.

use crate::error::MetadataError;
use crate::types::LastUpdate;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

/// Metadata a document declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    /// MDX components the document declares it uses
    pub components: Vec<String>,
    pub draft: bool,
    pub last_update: Option<LastUpdate>,
}

/// A frontmatter value after parsing, before it is mapped onto [`DocumentMetadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrontValue {
    Scalar(String),
    Bool(bool),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl FrontValue {
    fn into_scalar(self) -> Option<String> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Bool(b) => Some(b.to_string()),
            Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Lists stay as-is, scalars are split on commas.
    fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Scalar(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
            Self::Bool(_) | Self::Map(_) => Vec::new(),
        }
    }
}

/// Split a raw document into its declared metadata and its body.
///
/// Documents without a frontmatter block get default metadata (and therefore
/// an empty title) and their whole text as body.
pub fn split_frontmatter(raw: &str) -> Result<(DocumentMetadata, &str), MetadataError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some((first_line, rest)) = split_line(raw) else {
        return Ok((DocumentMetadata::default(), raw));
    };

    let delimiter = match first_line.trim_end() {
        "---" => "---",
        "+++" => "+++",
        _ => return Ok((DocumentMetadata::default(), raw)),
    };

    let mut offset = 0;
    let mut remaining = rest;
    while let Some((line, tail)) = split_line(remaining) {
        let trimmed = line.trim_end();
        if trimmed == delimiter || (delimiter == "---" && trimmed == "...") {
            let block = &rest[..offset];
            let fields = if delimiter == "+++" {
                parse_toml_block(block)?
            } else {
                parse_yaml_block(block)?
            };
            return Ok((metadata_from_fields(fields), tail));
        }
        offset += remaining.len() - tail.len();
        remaining = tail;
    }

    Err(MetadataError::Unterminated { delimiter })
}

/// Split off the first line (without its terminator). `None` on empty input.
fn split_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(index) => Some((text[..index].trim_end_matches('\r'), &text[index + 1..])),
        None => Some((text, "")),
    }
}

fn metadata_from_fields(mut fields: BTreeMap<String, FrontValue>) -> DocumentMetadata {
    let scalar = |fields: &mut BTreeMap<String, FrontValue>, key: &str| {
        fields
            .remove(key)
            .and_then(FrontValue::into_scalar)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let id = scalar(&mut fields, "id");
    let title = scalar(&mut fields, "title").unwrap_or_default();
    let description = scalar(&mut fields, "description");
    let keywords = fields
        .remove("keywords")
        .map(FrontValue::into_list)
        .unwrap_or_default();
    let tags = fields
        .remove("tags")
        .map(FrontValue::into_list)
        .unwrap_or_default();
    let components = fields
        .remove("components")
        .map(FrontValue::into_list)
        .unwrap_or_default();
    let draft = match fields.remove("draft") {
        Some(FrontValue::Bool(draft)) => draft,
        Some(FrontValue::Scalar(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };

    let last_update = match fields.remove("last_update") {
        Some(FrontValue::Map(mut map)) => map.remove("date").map(|date| LastUpdate {
            date,
            author: map.remove("author").filter(|a| !a.is_empty()),
        }),
        Some(FrontValue::Scalar(date)) if !date.is_empty() => Some(LastUpdate { date, author: None }),
        _ => None,
    };
    let last_update = last_update.or_else(|| {
        let time = scalar(&mut fields, "last_update_time")?;
        let date = time
            .parse::<i64>()
            .ok()
            .and_then(epoch_millis_to_iso8601)
            .unwrap_or(time);
        Some(LastUpdate {
            date,
            author: scalar(&mut fields, "last_update_author"),
        })
    });

    DocumentMetadata {
        id,
        title,
        description,
        keywords,
        tags,
        components,
        draft,
        last_update,
    }
}

fn parse_toml_block(block: &str) -> Result<BTreeMap<String, FrontValue>, MetadataError> {
    let table: toml::Table = toml::from_str(block)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_front(value)))
        .collect())
}

fn toml_to_front(value: toml::Value) -> FrontValue {
    match value {
        toml::Value::String(s) => FrontValue::Scalar(s),
        toml::Value::Boolean(b) => FrontValue::Bool(b),
        toml::Value::Array(items) => {
            FrontValue::List(items.into_iter().map(toml_to_string).collect())
        }
        toml::Value::Table(table) => FrontValue::Map(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_string(v)))
                .collect(),
        ),
        other => FrontValue::Scalar(toml_to_string(other)),
    }
}

fn toml_to_string(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn parse_yaml_block(block: &str) -> Result<BTreeMap<String, FrontValue>, MetadataError> {
    let lines: Vec<&str> = block.lines().collect();
    let mut fields = BTreeMap::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let line_number = index + 2; // 1-based, after the opening delimiter
        index += 1;

        if is_blank_or_comment(line) {
            continue;
        }
        if line.starts_with([' ', '\t']) {
            return Err(MetadataError::Malformed {
                line: line_number,
                reason: "indented line outside of a list or map".to_string(),
            });
        }

        let Some((key, rest)) = line.split_once(':') else {
            return Err(MetadataError::Malformed {
                line: line_number,
                reason: "expected `key: value`".to_string(),
            });
        };
        let key = key.trim().to_string();
        let rest = rest.trim();

        // Collect the indented continuation belonging to this key
        // A block list may also sit at the key's own indentation
        let start = index;
        while index < lines.len()
            && (lines[index].starts_with([' ', '\t'])
                || lines[index].trim().is_empty()
                || (rest.is_empty() && is_list_item(lines[index])))
        {
            index += 1;
        }
        let nested: Vec<&str> = lines[start..index]
            .iter()
            .copied()
            .filter(|l| !is_blank_or_comment(l))
            .collect();

        let value = match rest {
            "" if nested.is_empty() => FrontValue::Scalar(String::new()),
            "" => parse_nested(&nested, start + 2)?,
            "|" | "|-" => FrontValue::Scalar(
                nested.iter().map(|l| l.trim()).collect::<Vec<_>>().join("\n"),
            ),
            ">" | ">-" => FrontValue::Scalar(
                nested.iter().map(|l| l.trim()).collect::<Vec<_>>().join(" "),
            ),
            _ if rest.starts_with('[') => parse_inline_list(rest, line_number)?,
            "true" => FrontValue::Bool(true),
            "false" => FrontValue::Bool(false),
            _ => FrontValue::Scalar(unquote(strip_comment(rest))),
        };
        fields.insert(key, value);
    }

    Ok(fields)
}

/// Parse the indented lines under a key: either a block list or a flat map.
fn parse_nested(lines: &[&str], first_line: usize) -> Result<FrontValue, MetadataError> {
    if lines.iter().all(|l| l.trim_start().starts_with('-')) {
        let items = lines
            .iter()
            .map(|l| unquote(strip_comment(l.trim_start()[1..].trim())))
            .filter(|item| !item.is_empty())
            .collect();
        return Ok(FrontValue::List(items));
    }

    let mut map = BTreeMap::new();
    for (offset, line) in lines.iter().enumerate() {
        let Some((key, value)) = line.trim().split_once(':') else {
            return Err(MetadataError::Malformed {
                line: first_line + offset,
                reason: "expected `key: value` inside nested map".to_string(),
            });
        };
        map.insert(key.trim().to_string(), unquote(strip_comment(value.trim())));
    }
    Ok(FrontValue::Map(map))
}

fn parse_inline_list(rest: &str, line: usize) -> Result<FrontValue, MetadataError> {
    let inner = strip_comment(rest)
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| MetadataError::Malformed {
            line,
            reason: "unterminated inline list".to_string(),
        })?;
    Ok(FrontValue::List(
        inner
            .split(',')
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .collect(),
    ))
}

fn is_list_item(line: &str) -> bool {
    line == "-" || line.starts_with("- ")
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Drop a trailing ` # comment` from an unquoted value.
fn strip_comment(value: &str) -> &str {
    if value.starts_with(['"', '\'']) {
        return value;
    }
    value.find(" #").map_or(value, |index| value[..index].trim_end())
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if value.len() >= 2 && bytes[0] == bytes[value.len() - 1] {
        match bytes[0] {
            b'"' => return value[1..value.len() - 1].replace("\\\"", "\""),
            b'\'' => return value[1..value.len() - 1].replace("''", "'"),
            _ => {}
        }
    }
    value.to_string()
}

/// Format milliseconds since the Unix epoch as an ISO-8601 UTC timestamp.
fn epoch_millis_to_iso8601(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
}
