//! Decoders for the folder browse and ignores JSON bodies.
//!
//! Browse bodies map entry names to an object (a directory, holding its
//! children when more levels were requested) or an array (a file,
//! `[modTime, size]`). Ignores bodies carry the raw lines under `ignore`.

use ignore_tree_domain::{PatternSyntax, PrimitiveError};
use ignore_tree_ports::{FileEntry, ListingPrefix, PatternList};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope};
use serde_json::{Map, Value};
use thiserror::Error;

/// A browse or ignores body that does not have the expected shape.
#[derive(Debug, Error)]
pub enum BrowseDecodeError {
    /// The body is not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A directory level is not a JSON object.
    #[error("expected an object of entries at '{path}'")]
    NotAnObject {
        /// Root-relative path of the level.
        path: String,
    },
    /// An entry value is neither an object nor an array.
    #[error("entry '{path}' is neither a directory nor a file")]
    UnknownEntry {
        /// Root-relative entry path.
        path: String,
    },
    /// An entry name cannot be used as a path segment.
    #[error("invalid entry name under '{parent}': {source}")]
    InvalidName {
        /// Parent path of the entry.
        parent: String,
        /// Validation failure.
        source: PrimitiveError,
    },
    /// The ignores body has no `ignore` list of strings.
    #[error("ignores response has no 'ignore' list of strings")]
    MissingIgnoreList,
}

impl From<BrowseDecodeError> for ErrorEnvelope {
    fn from(error: BrowseDecodeError) -> Self {
        let message = error.to_string();
        let envelope = Self::expected(ErrorCode::new("browse", "invalid_response"), message);
        match error {
            BrowseDecodeError::NotAnObject { path } | BrowseDecodeError::UnknownEntry { path } => {
                envelope.with_metadata("path", path)
            },
            BrowseDecodeError::InvalidName { parent, .. } => envelope.with_metadata("path", parent),
            BrowseDecodeError::Json(_) | BrowseDecodeError::MissingIgnoreList => envelope,
        }
    }
}

/// Decode a browse body fetched for `prefix`.
///
/// Entries are sorted by name within each level; a directory's children
/// follow it directly.
pub fn decode_browse(
    prefix: &ListingPrefix,
    body: &Value,
) -> Result<Vec<FileEntry>, BrowseDecodeError> {
    let mut entries = Vec::new();
    let Some(level) = body.as_object() else {
        return Err(BrowseDecodeError::NotAnObject {
            path: prefix.as_str().to_owned(),
        });
    };
    decode_level(prefix.as_parent(), level, &mut entries)?;
    Ok(entries)
}

/// Decode a browse body from raw text.
pub fn decode_browse_str(
    prefix: &ListingPrefix,
    body: &str,
) -> Result<Vec<FileEntry>, BrowseDecodeError> {
    decode_browse(prefix, &serde_json::from_str(body)?)
}

fn decode_level(
    parent: Option<&str>,
    level: &Map<String, Value>,
    entries: &mut Vec<FileEntry>,
) -> Result<(), BrowseDecodeError> {
    let mut names: Vec<(&String, &Value)> = level.iter().collect();
    names.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in names {
        let is_file = match value {
            Value::Object(_) => false,
            Value::Array(_) => true,
            _ => {
                let path = parent.map_or_else(|| name.clone(), |parent| format!("{parent}/{name}"));
                return Err(BrowseDecodeError::UnknownEntry { path });
            },
        };
        let entry = FileEntry::under(parent, name, is_file).map_err(|source| {
            BrowseDecodeError::InvalidName {
                parent: parent.unwrap_or_default().to_owned(),
                source,
            }
        })?;
        let path = entry.path.clone();
        entries.push(entry);
        if let Value::Object(children) = value {
            decode_level(Some(&*path), children, entries)?;
        }
    }
    Ok(())
}

/// Decode an ignores body (`{"ignore": ["/Photos", "!/Music"]}`).
///
/// A `null` list is an empty file.
pub fn decode_ignores(
    body: &Value,
    syntax: PatternSyntax,
) -> Result<PatternList, BrowseDecodeError> {
    let lines = match body.get("ignore") {
        Some(Value::Null) => return Ok(PatternList::new()),
        Some(Value::Array(lines)) => lines,
        _ => return Err(BrowseDecodeError::MissingIgnoreList),
    };
    let text = lines
        .iter()
        .map(|line| line.as_str().ok_or(BrowseDecodeError::MissingIgnoreList))
        .collect::<Result<Vec<_>, _>>()?
        .join("\n");
    Ok(syntax.parse(&text))
}

/// Encode a pattern list as an ignores body.
#[must_use]
pub fn encode_ignores(list: &PatternList, syntax: PatternSyntax) -> Value {
    let lines: Vec<Value> = syntax
        .render(list)
        .lines()
        .map(Value::from)
        .collect();
    serde_json::json!({ "ignore": lines })
}
