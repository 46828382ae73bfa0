//! Pattern resolution.
//!
//! For every file, the governing pattern is the most specific pattern whose
//! path equals the file path or names one of its ancestor directories. Equal
//! specificity is broken by the greater sequence.

use crate::pattern::Pattern;
use crate::primitives::FileEntry;
use serde::{Deserialize, Serialize};

/// Resolution result for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// The file this record describes.
    pub file: FileEntry,
    /// Winning pattern, if any pattern covers the file.
    pub governing_pattern: Option<Pattern>,
    /// True when the governing pattern names an ancestor directory.
    pub inherited: bool,
}

impl MatchRecord {
    /// Resolve a single file against `patterns`.
    #[must_use]
    pub fn resolve_one(patterns: &[Pattern], file: &FileEntry) -> Self {
        let governing_pattern = governing_pattern(patterns, &file.path).cloned();
        let inherited = governing_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.path.as_str() != file.path.as_ref());
        Self {
            file: file.clone(),
            governing_pattern,
            inherited,
        }
    }

    /// True when a governing pattern exists and is not negated.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.governing_pattern
            .as_ref()
            .is_some_and(Pattern::is_ignore)
    }
}

/// Resolve every file in `files`, preserving input order.
#[must_use]
pub fn resolve(patterns: &[Pattern], files: &[FileEntry]) -> Vec<MatchRecord> {
    files
        .iter()
        .map(|file| MatchRecord::resolve_one(patterns, file))
        .collect()
}

/// Select the governing pattern for `path`.
#[must_use]
pub fn governing_pattern<'a>(patterns: &'a [Pattern], path: &str) -> Option<&'a Pattern> {
    patterns
        .iter()
        .filter(|pattern| pattern.path.covers(path))
        .max_by_key(|pattern| (pattern.path.specificity(), pattern.sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternError, PatternList, PatternPath};
    use crate::primitives::PrimitiveError;
    use proptest::prelude::*;

    fn dir(prefix: Option<&str>, name: &str) -> Result<FileEntry, PrimitiveError> {
        FileEntry::under(prefix, name, false)
    }

    #[test]
    fn unmatched_file_has_no_pattern() -> Result<(), Box<dyn std::error::Error>> {
        let record = MatchRecord::resolve_one(&[], &dir(None, "Backups")?);
        assert_eq!(record.governing_pattern, None);
        assert!(!record.inherited);
        assert!(!record.is_ignored());
        Ok(())
    }

    #[test]
    fn sibling_prefix_is_not_an_ancestor() -> Result<(), Box<dyn std::error::Error>> {
        let mut list = PatternList::new();
        list.push(PatternPath::parse("Photo")?, false);
        let records = resolve(&list.to_patterns(), &[dir(None, "Photos")?]);
        assert_eq!(records[0].governing_pattern, None);
        Ok(())
    }

    #[test]
    fn duplicate_paths_resolve_to_latest() -> Result<(), Box<dyn std::error::Error>> {
        let mut list = PatternList::new();
        list.push(PatternPath::parse("Photos")?, false);
        let latest = list.push(PatternPath::parse("Photos")?, true);
        let records = resolve(&list.to_patterns(), &[dir(None, "Photos")?]);
        assert_eq!(records[0].governing_pattern.as_ref(), Some(&latest));
        assert!(!records[0].is_ignored());
        Ok(())
    }

    #[test]
    fn output_order_follows_input() -> Result<(), PatternError> {
        let files: Vec<FileEntry> = ["c", "a", "b"]
            .iter()
            .filter_map(|name| FileEntry::under(None, name, true).ok())
            .collect();
        let records = resolve(&[], &files);
        let paths: Vec<&str> = records.iter().map(|r| r.file.path.as_ref()).collect();
        assert_eq!(paths, ["c", "a", "b"]);
        Ok(())
    }

    proptest! {
        #[test]
        fn resolve_is_deterministic(
            rules in prop::collection::vec((tree_path(), any::<bool>()), 0..8),
            paths in prop::collection::vec(tree_path(), 1..8),
        ) {
            let patterns = build_patterns(&rules);
            let files = build_files(&paths);
            prop_assert_eq!(resolve(&patterns, &files), resolve(&patterns, &files));
        }

        #[test]
        fn more_specific_pattern_wins(
            ancestor in tree_path(),
            child in segment(),
            negated in any::<bool>(),
            child_first in any::<bool>(),
        ) {
            let descendant = format!("{ancestor}/{child}");
            let rules = if child_first {
                vec![(descendant.clone(), negated), (ancestor, !negated)]
            } else {
                vec![(ancestor, !negated), (descendant.clone(), negated)]
            };
            let patterns = build_patterns(&rules);
            let files = build_files(&[format!("{descendant}/leaf")]);
            let record = &resolve(&patterns, &files)[0];
            let winner = record.governing_pattern.as_ref().map(|p| p.path.to_string());
            prop_assert_eq!(winner, Some(descendant));
            prop_assert!(record.inherited);
        }

        #[test]
        fn more_recent_pattern_wins_on_equal_length(
            path in tree_path(),
            senses in prop::collection::vec(any::<bool>(), 1..6),
        ) {
            let rules: Vec<(String, bool)> =
                senses.iter().map(|negated| (path.clone(), *negated)).collect();
            let patterns = build_patterns(&rules);
            let files = build_files(&[path]);
            let record = &resolve(&patterns, &files)[0];
            prop_assert_eq!(record.governing_pattern.as_ref(), patterns.last());
            prop_assert!(!record.inherited);
        }
    }

    fn segment() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "ab", "Photos"]).prop_map(str::to_owned)
    }

    fn tree_path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..4).prop_map(|segments| segments.join("/"))
    }

    fn build_patterns(rules: &[(String, bool)]) -> Vec<Pattern> {
        let mut list = PatternList::new();
        for (path, negated) in rules {
            if let Ok(path) = PatternPath::parse(path) {
                list.push(path, *negated);
            }
        }
        list.to_patterns()
    }

    fn build_files(paths: &[String]) -> Vec<FileEntry> {
        paths
            .iter()
            .filter_map(|path| {
                let (prefix, name) = path
                    .rsplit_once('/')
                    .map_or((None, path.as_str()), |(prefix, name)| (Some(prefix), name));
                FileEntry::under(prefix, name, true).ok()
            })
            .collect()
    }
}
