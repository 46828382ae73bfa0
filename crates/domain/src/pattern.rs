//! Ignore patterns and the ordered pattern list.
//!
//! A pattern is a literal root-relative path, optionally negated. The list is
//! append-or-remove only; its recency tie-break uses an explicit sequence
//! counter that never goes backwards, so removing an entry never changes how
//! the remaining entries compare.

use ignore_tree_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation and edit failures for patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern path is empty after stripping slashes.
    EmptyPath {
        /// Raw input as received.
        input: String,
    },
    /// The pattern path contains an empty, `.` or `..` segment.
    InvalidSegment {
        /// Raw input as received.
        input: String,
    },
    /// The pattern text uses syntax the literal resolver does not support.
    UnsupportedSyntax {
        /// Raw input as received.
        input: String,
    },
    /// The pattern to remove is not in the list.
    UnknownPattern {
        /// Display form of the pattern.
        pattern: String,
    },
}

impl PatternError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyPath { .. } => ErrorCode::new("pattern", "empty_path"),
            Self::InvalidSegment { .. } => ErrorCode::new("pattern", "invalid_segment"),
            Self::UnsupportedSyntax { .. } => ErrorCode::new("pattern", "unsupported_syntax"),
            Self::UnknownPattern { .. } => ErrorCode::new("pattern", "unknown_pattern"),
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath { .. } => formatter.write_str("pattern path must be non-empty"),
            Self::InvalidSegment { .. } => {
                formatter.write_str("pattern path must not contain empty, '.' or '..' segments")
            },
            Self::UnsupportedSyntax { .. } => {
                formatter.write_str("only literal path patterns are supported")
            },
            Self::UnknownPattern { .. } => formatter.write_str("pattern is not in the list"),
        }
    }
}

impl std::error::Error for PatternError {}

impl From<PatternError> for ErrorEnvelope {
    fn from(error: PatternError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PatternError::EmptyPath { input }
            | PatternError::InvalidSegment { input }
            | PatternError::UnsupportedSyntax { input } => envelope.with_metadata("input", input),
            PatternError::UnknownPattern { pattern } => envelope.with_metadata("pattern", pattern),
        }
    }
}

/// A validated, root-relative pattern path without leading or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatternPath(Box<str>);

impl PatternPath {
    /// Parse a path, stripping surrounding whitespace and slashes.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PatternError> {
        let raw = input.as_ref();
        let stripped = raw.trim().trim_matches('/');
        if stripped.is_empty() {
            return Err(PatternError::EmptyPath {
                input: raw.to_owned(),
            });
        }
        if stripped
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(PatternError::InvalidSegment {
                input: raw.to_owned(),
            });
        }
        Ok(Self(stripped.to_owned().into_boxed_str()))
    }

    /// Take a listed entry's path as-is, without trimming.
    ///
    /// Pattern text is trimmed line by line, so a path with leading or
    /// trailing whitespace cannot be written back and is rejected.
    pub fn from_entry_path(path: &str) -> Result<Self, PatternError> {
        if path.is_empty() {
            return Err(PatternError::EmptyPath {
                input: path.to_owned(),
            });
        }
        if path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(PatternError::InvalidSegment {
                input: path.to_owned(),
            });
        }
        if path.trim() != path {
            return Err(PatternError::UnsupportedSyntax {
                input: path.to_owned(),
            });
        }
        Ok(Self(path.into()))
    }

    /// Borrow the path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Specificity of the path: its length in bytes.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.0.len()
    }

    /// True when this path equals `path` or is a proper ancestor directory of it.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        path.strip_prefix(self.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl TryFrom<String> for PatternPath {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PatternPath> for String {
    fn from(value: PatternPath) -> Self {
        value.0.into_string()
    }
}

impl fmt::Display for PatternPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Insertion stamp of a pattern; greater means more recently added.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PatternSequence(u64);

impl PatternSequence {
    /// Wrap a raw sequence value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw sequence value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for PatternSequence {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// A single ignore (or, when negated, include) rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// Root-relative path the rule applies to (and everything below it).
    pub path: PatternPath,
    /// True for an explicit include, false for an ignore.
    pub negated: bool,
    /// Position in the authoritative list; the recency tie-break.
    pub sequence: PatternSequence,
}

impl Pattern {
    /// True when the rule ignores the paths it governs.
    #[must_use]
    pub const fn is_ignore(&self) -> bool {
        !self.negated
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.negated { "!" } else { "" };
        write!(formatter, "{marker}/{} {}", self.path, self.sequence)
    }
}

/// One line of a pattern file: a resolvable rule or text kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternLine {
    /// A literal rule consulted by the resolver.
    Rule {
        /// The parsed rule.
        pattern: Pattern,
        /// Line text the rule was parsed from; `None` for appended rules.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original: Option<Box<str>>,
    },
    /// Text the resolver does not interpret (globs, comments).
    Verbatim {
        /// The original line.
        text: Box<str>,
    },
}

/// The authoritative ordered pattern list of one folder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternList {
    lines: Vec<PatternLine>,
    next_sequence: PatternSequence,
}

impl PatternList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from already-stamped patterns, keeping their sequences.
    #[must_use]
    pub fn from_patterns(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let mut list = Self::new();
        for pattern in patterns {
            if pattern.sequence >= list.next_sequence {
                list.next_sequence = pattern.sequence.next();
            }
            list.lines.push(PatternLine::Rule {
                pattern,
                original: None,
            });
        }
        list
    }

    /// Append a rule stamped one past every sequence ever handed out.
    pub fn push(&mut self, path: PatternPath, negated: bool) -> Pattern {
        self.push_line(path, negated, None)
    }

    /// Append a rule read from `original`, which is written back unchanged.
    pub fn push_parsed(
        &mut self,
        path: PatternPath,
        negated: bool,
        original: impl Into<Box<str>>,
    ) -> Pattern {
        self.push_line(path, negated, Some(original.into()))
    }

    fn push_line(&mut self, path: PatternPath, negated: bool, original: Option<Box<str>>) -> Pattern {
        let pattern = Pattern {
            path,
            negated,
            sequence: self.next_sequence,
        };
        self.next_sequence = self.next_sequence.next();
        self.lines.push(PatternLine::Rule {
            pattern: pattern.clone(),
            original,
        });
        pattern
    }

    /// Append a line the resolver will not interpret.
    pub fn push_verbatim(&mut self, text: impl Into<Box<str>>) {
        self.lines.push(PatternLine::Verbatim { text: text.into() });
    }

    /// Remove exactly `pattern` (path, sense, and sequence must all match).
    pub fn remove(&mut self, pattern: &Pattern) -> Result<(), PatternError> {
        let position = self.lines.iter().position(
            |line| matches!(line, PatternLine::Rule { pattern: candidate, .. } if candidate == pattern),
        );
        let Some(position) = position else {
            return Err(PatternError::UnknownPattern {
                pattern: pattern.to_string(),
            });
        };
        self.lines.remove(position);
        Ok(())
    }

    /// True when `pattern` is currently in the list.
    #[must_use]
    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.patterns().any(|candidate| candidate == pattern)
    }

    /// Iterate the resolvable rules in list order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.lines.iter().filter_map(|line| match line {
            PatternLine::Rule { pattern, .. } => Some(pattern),
            PatternLine::Verbatim { .. } => None,
        })
    }

    /// Snapshot of the resolvable rules in list order.
    #[must_use]
    pub fn to_patterns(&self) -> Vec<Pattern> {
        self.patterns().cloned().collect()
    }

    /// All lines, rules and verbatim text, in file order.
    #[must_use]
    pub fn lines(&self) -> &[PatternLine] {
        &self.lines
    }

    /// Number of resolvable rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns().count()
    }

    /// True when there are no resolvable rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sequence the next appended rule will receive.
    #[must_use]
    pub const fn next_sequence(&self) -> PatternSequence {
        self.next_sequence
    }
}
