//! In-memory pattern store.

use ignore_tree_ports::{FolderId, Pattern, PatternList, PatternStorePort, PatternSyntax};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Pattern lists held in memory, keyed by folder.
///
/// Unknown folders read as an empty list; the first edit creates them.
#[derive(Debug, Default)]
pub struct InMemoryPatternStore {
    syntax: PatternSyntax,
    folders: Mutex<HashMap<FolderId, PatternList>>,
}

impl InMemoryPatternStore {
    /// Create an empty store using `syntax`.
    #[must_use]
    pub fn new(syntax: PatternSyntax) -> Self {
        Self {
            syntax,
            folders: Mutex::new(HashMap::new()),
        }
    }

    /// Seed `folder` with parsed `text`.
    #[must_use]
    pub fn with_text(self, folder: &FolderId, text: &str) -> Self {
        let list = self.syntax.parse(text);
        if let Ok(mut folders) = self.folders.lock() {
            folders.insert(folder.clone(), list);
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<FolderId, PatternList>>> {
        self.folders.lock().map_err(|_| {
            ErrorEnvelope::invariant(ErrorCode::internal(), "pattern store lock poisoned")
        })
    }
}

impl PatternStorePort for InMemoryPatternStore {
    fn syntax(&self) -> PatternSyntax {
        self.syntax
    }

    fn patterns(&self, folder: &FolderId) -> Result<PatternList> {
        Ok(self.lock()?.get(folder).cloned().unwrap_or_default())
    }

    fn add_pattern(&self, folder: &FolderId, text: &str) -> Result<Pattern> {
        let (path, negated) = self.syntax.parse_rule(text)?;
        Ok(self
            .lock()?
            .entry(folder.clone())
            .or_default()
            .push(path, negated))
    }

    fn remove_pattern(&self, folder: &FolderId, pattern: &Pattern) -> Result<()> {
        let mut folders = self.lock()?;
        let list = folders.entry(folder.clone()).or_default();
        list.remove(pattern)?;
        Ok(())
    }

    fn load_text(&self, folder: &FolderId, text: &str) -> Result<()> {
        let list = self.syntax.parse(text);
        self.lock()?.insert(folder.clone(), list);
        Ok(())
    }

    fn text(&self, folder: &FolderId) -> Result<String> {
        let folders = self.lock()?;
        Ok(folders
            .get(folder)
            .map(|list| self.syntax.render(list))
            .unwrap_or_default())
    }
}
