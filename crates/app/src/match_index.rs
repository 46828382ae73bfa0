//! Per-folder cache of resolved match records.
//!
//! Records are rebuilt wholesale on every recompute and never patched. The
//! listing used for the last recompute is kept so a pattern edit can be
//! re-resolved without fetching it again.

use ignore_tree_domain::{
    FileEntry, FolderId, MatchRecord, Pattern, PatternError, ToggleEdit, plan_toggle, resolve,
};
use ignore_tree_ports::PatternStorePort;
use ignore_tree_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Match index shared between the tree sync and the browser use case.
pub type SharedMatchIndex = Arc<Mutex<MatchIndex>>;

/// Lock a shared index, mapping poisoning to `core:internal`.
pub fn lock_index(index: &Mutex<MatchIndex>) -> Result<MutexGuard<'_, MatchIndex>> {
    index.lock().map_err(|_| {
        ErrorEnvelope::invariant(ErrorCode::internal(), "match index lock poisoned")
    })
}

#[derive(Debug, Clone, Default)]
struct FolderMatches {
    files: Vec<FileEntry>,
    records: Vec<MatchRecord>,
}

/// Resolved records keyed by folder.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    folders: HashMap<FolderId, FolderMatches>,
}

impl MatchIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `files` against `patterns`, replacing the folder's records.
    pub fn recompute(
        &mut self,
        folder: &FolderId,
        files: Vec<FileEntry>,
        patterns: &[Pattern],
    ) -> &[MatchRecord] {
        let records = resolve(patterns, &files);
        let entry = self.folders.entry(folder.clone()).or_default();
        *entry = FolderMatches { files, records };
        &entry.records
    }

    /// Re-resolve the folder's last listing against `patterns`.
    pub fn reresolve(&mut self, folder: &FolderId, patterns: &[Pattern]) -> Result<&[MatchRecord]> {
        let Some(entry) = self.folders.get_mut(folder) else {
            return Err(ErrorEnvelope::expected(
                ErrorCode::not_found(),
                "no listing has been resolved for this folder",
            )
            .with_metadata("folderId", folder.as_str()));
        };
        entry.records = resolve(patterns, &entry.files);
        Ok(&entry.records)
    }

    /// Latest records for `folder`; empty if never computed.
    #[must_use]
    pub fn for_folder(&self, folder: &FolderId) -> &[MatchRecord] {
        self.folders
            .get(folder)
            .map(|entry| entry.records.as_slice())
            .unwrap_or_default()
    }

    /// Latest record for the entry at `path`.
    #[must_use]
    pub fn record(&self, folder: &FolderId, path: &str) -> Option<&MatchRecord> {
        self.for_folder(folder)
            .iter()
            .find(|record| record.file.path.as_ref() == path)
    }

    /// Drop everything cached for `folder`.
    pub fn forget(&mut self, folder: &FolderId) {
        self.folders.remove(folder);
    }

    /// Apply the single list edit that flips `record`, through `store`.
    ///
    /// Does not recompute; callers follow up with `reresolve` or
    /// `recompute`. Fails with `core:invalid_input` when `record` is not in
    /// the folder's current set or its governing pattern is no longer stored,
    /// and with `pattern:unsupported_syntax` when the rule for the file's
    /// path would read back as a different rule.
    pub fn toggle(
        &self,
        store: &dyn PatternStorePort,
        folder: &FolderId,
        record: &MatchRecord,
    ) -> Result<ToggleEdit> {
        if !self.for_folder(folder).contains(record) {
            return Err(stale_record(folder, record, "record is not in the folder's current set"));
        }
        if let Some(pattern) = record.governing_pattern.as_ref() {
            if !store.patterns(folder)?.contains(pattern) {
                return Err(stale_record(
                    folder,
                    record,
                    "governing pattern was removed since the record was resolved",
                ));
            }
        }

        let edit = plan_toggle(record)?;
        match &edit {
            ToggleEdit::Append { path, negated } => {
                let syntax = store.syntax();
                let line = syntax.render_rule(path, *negated);
                let reads_back = syntax
                    .parse_rule(&line)
                    .is_ok_and(|(parsed, sense)| &parsed == path && sense == *negated);
                if !reads_back {
                    return Err(ErrorEnvelope::from(PatternError::UnsupportedSyntax {
                        input: line,
                    })
                    .with_metadata("folderId", folder.as_str()));
                }
                store.add_pattern(folder, &line)?;
            },
            ToggleEdit::Remove { pattern } => store.remove_pattern(folder, pattern)?,
        }
        Ok(edit)
    }
}

fn stale_record(folder: &FolderId, record: &MatchRecord, message: &str) -> ErrorEnvelope {
    ErrorEnvelope::expected(ErrorCode::invalid_input(), message)
        .with_metadata("folderId", folder.as_str())
        .with_metadata("path", &*record.file.path)
}
