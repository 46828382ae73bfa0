//! Newline-delimited pattern text.
//!
//! Literal path lines become rules. Anything else (globs, `(?i)` style flags,
//! `//` comments, `#include` directives) is carried through untouched so that
//! writing the list back never loses a line the resolver does not understand.

use crate::pattern::{PatternError, PatternList, PatternPath};
use serde::{Deserialize, Serialize};

const GLOB_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Surface syntax of rule lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSyntax {
    /// Prefix marking an include rule.
    pub negation_marker: char,
    /// Write rules with a leading `/`.
    pub root_anchor: bool,
}

impl Default for PatternSyntax {
    fn default() -> Self {
        Self {
            negation_marker: '!',
            root_anchor: true,
        }
    }
}

impl PatternSyntax {
    /// Parse one rule line into its path and sense.
    pub fn parse_rule(&self, line: &str) -> Result<(PatternPath, bool), PatternError> {
        let trimmed = line.trim();
        let (negated, body) = trimmed
            .strip_prefix(self.negation_marker)
            .map_or((false, trimmed), |rest| (true, rest));
        if body.starts_with("//")
            || body.starts_with('#')
            || body.contains("(?")
            || body.contains(GLOB_CHARS)
        {
            return Err(PatternError::UnsupportedSyntax {
                input: line.to_owned(),
            });
        }
        let path = PatternPath::parse(body).map_err(|error| match error {
            PatternError::EmptyPath { .. } => PatternError::EmptyPath {
                input: line.to_owned(),
            },
            _ => PatternError::InvalidSegment {
                input: line.to_owned(),
            },
        })?;
        Ok((path, negated))
    }

    /// Parse a whole pattern file. Rules get sequences in file order.
    #[must_use]
    pub fn parse(&self, text: &str) -> PatternList {
        let mut list = PatternList::new();
        for line in text.lines() {
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_rule(line) {
                Ok((path, negated)) => {
                    list.push_parsed(path, negated, line);
                },
                Err(_) => list.push_verbatim(line),
            }
        }
        list
    }

    /// Render a single rule line.
    #[must_use]
    pub fn render_rule(&self, path: &PatternPath, negated: bool) -> String {
        let mut line = String::with_capacity(path.as_str().len() + 2);
        if negated {
            line.push(self.negation_marker);
        }
        if self.root_anchor {
            line.push('/');
        }
        line.push_str(path.as_str());
        line
    }

    /// Render the list back to text, one line per entry, newline-terminated.
    ///
    /// Parsed rules keep their original text; only appended rules are
    /// written in this syntax's form.
    #[must_use]
    pub fn render(&self, list: &PatternList) -> String {
        use crate::pattern::PatternLine;

        let mut out = String::new();
        for line in list.lines() {
            match line {
                PatternLine::Rule {
                    original: Some(text),
                    ..
                } => out.push_str(text),
                PatternLine::Rule { pattern, .. } => {
                    out.push_str(&self.render_rule(&pattern.path, pattern.negated));
                },
                PatternLine::Verbatim { text } => out.push_str(text),
            }
            out.push('\n');
        }
        out
    }
}
