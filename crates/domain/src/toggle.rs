//! Minimal single-pattern edits that flip a file's resolved sense.

use crate::matcher::MatchRecord;
use crate::pattern::{Pattern, PatternError, PatternList, PatternPath};
use serde::{Deserialize, Serialize};

/// The one list edit a toggle performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ToggleEdit {
    /// Append a new rule for the file's own path.
    Append {
        /// The file's path.
        path: PatternPath,
        /// Sense of the new rule.
        negated: bool,
    },
    /// Remove the file's direct rule.
    Remove {
        /// The exact pattern to remove.
        pattern: Pattern,
    },
}

/// Decide which edit flips `record`.
///
/// - no governing pattern: append an ignore rule for the file
/// - direct match: remove that pattern
/// - inherited match: append a rule of the opposite sense for the file
///
/// Fails when the file's path cannot be written as a rule, rather than
/// appending a rule for some other path.
pub fn plan_toggle(record: &MatchRecord) -> Result<ToggleEdit, PatternError> {
    match &record.governing_pattern {
        None => Ok(ToggleEdit::Append {
            path: PatternPath::from_entry_path(&record.file.path)?,
            negated: false,
        }),
        Some(pattern) if !record.inherited => Ok(ToggleEdit::Remove {
            pattern: pattern.clone(),
        }),
        Some(pattern) => Ok(ToggleEdit::Append {
            path: PatternPath::from_entry_path(&record.file.path)?,
            negated: !pattern.negated,
        }),
    }
}

impl PatternList {
    /// Apply a toggle edit, returning the appended pattern if any.
    pub fn apply(&mut self, edit: ToggleEdit) -> Result<Option<Pattern>, PatternError> {
        match edit {
            ToggleEdit::Append { path, negated } => Ok(Some(self.push(path, negated))),
            ToggleEdit::Remove { pattern } => {
                self.remove(&pattern)?;
                Ok(None)
            },
        }
    }
}
