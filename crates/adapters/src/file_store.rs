//! Pattern store persisted as one newline-delimited ignore file per folder.
//!
//! Each folder is registered with the path of its ignore file. The file is
//! read on first access and rewritten after every edit; an edit whose write
//! fails leaves the cached list untouched.

use ignore_tree_ports::{FolderId, Pattern, PatternList, PatternStorePort, PatternSyntax};
use ignore_tree_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Failures reading or writing an ignore file.
#[derive(Debug, Error)]
pub enum PatternFileError {
    /// No ignore file is registered for the folder.
    #[error("no ignore file registered for folder {folder}")]
    UnknownFolder {
        /// Folder id.
        folder: String,
    },
    /// The ignore file exists but could not be read.
    #[error("failed to read ignore file {}: {source}", path.display())]
    Read {
        /// Ignore file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The ignore file could not be written.
    #[error("failed to write ignore file {}: {source}", path.display())]
    Write {
        /// Ignore file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl From<PatternFileError> for ErrorEnvelope {
    fn from(error: PatternFileError) -> Self {
        let message = error.to_string();
        match error {
            PatternFileError::UnknownFolder { folder } => {
                Self::expected(ErrorCode::not_found(), message).with_metadata("folderId", folder)
            },
            PatternFileError::Read { path, source } => Self::unexpected(
                ErrorCode::new("pattern_file", "read_failed"),
                message,
                ErrorClass::from_io_kind(source.kind()),
            )
            .with_metadata("path", path.display().to_string()),
            PatternFileError::Write { path, source } => Self::unexpected(
                ErrorCode::new("pattern_file", "write_failed"),
                message,
                ErrorClass::from_io_kind(source.kind()),
            )
            .with_metadata("path", path.display().to_string()),
        }
    }
}

/// Pattern store writing through to ignore files on disk.
#[derive(Debug)]
pub struct FilePatternStore {
    syntax: PatternSyntax,
    files: HashMap<FolderId, PathBuf>,
    loaded: Mutex<HashMap<FolderId, PatternList>>,
}

impl FilePatternStore {
    /// Create a store with no registered folders.
    #[must_use]
    pub fn new(syntax: PatternSyntax) -> Self {
        Self {
            syntax,
            files: HashMap::new(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Register `folder`'s ignore file, e.g. `<folder root>/.stignore`.
    #[must_use]
    pub fn with_folder(mut self, folder: FolderId, file: impl Into<PathBuf>) -> Self {
        self.files.insert(folder, file.into());
        self
    }

    /// Path registered for `folder`.
    pub fn file_for(&self, folder: &FolderId) -> Option<&Path> {
        self.files.get(folder).map(PathBuf::as_path)
    }

    /// Drop the cached list and re-read `folder`'s file.
    pub fn reload(&self, folder: &FolderId) -> Result<PatternList> {
        let list = self.read_file(folder)?;
        self.lock()?.insert(folder.clone(), list.clone());
        Ok(list)
    }

    fn path(&self, folder: &FolderId) -> std::result::Result<&Path, PatternFileError> {
        self.file_for(folder)
            .ok_or_else(|| PatternFileError::UnknownFolder {
                folder: folder.as_str().to_owned(),
            })
    }

    fn read_file(&self, folder: &FolderId) -> Result<PatternList> {
        let path = self.path(folder)?;
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(self.syntax.parse(&text)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(PatternList::new()),
            Err(source) => Err(PatternFileError::Read {
                path: path.to_path_buf(),
                source,
            }
            .into()),
        }
    }

    fn write_file(&self, folder: &FolderId, list: &PatternList) -> Result<()> {
        let path = self.path(folder)?;
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, self.syntax.render(list))
        };
        write().map_err(|source| {
            PatternFileError::Write {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Run `edit` on a copy of the folder's list, persist it, then commit.
    fn edit<T>(
        &self,
        folder: &FolderId,
        edit: impl FnOnce(&mut PatternList) -> Result<T>,
    ) -> Result<T> {
        let mut loaded = self.lock()?;
        let mut list = match loaded.get(folder) {
            Some(list) => list.clone(),
            None => self.read_file(folder)?,
        };
        let value = edit(&mut list)?;
        self.write_file(folder, &list)?;
        loaded.insert(folder.clone(), list);
        Ok(value)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<FolderId, PatternList>>> {
        self.loaded.lock().map_err(|_| {
            ErrorEnvelope::invariant(ErrorCode::internal(), "pattern file cache lock poisoned")
        })
    }
}

impl PatternStorePort for FilePatternStore {
    fn syntax(&self) -> PatternSyntax {
        self.syntax
    }

    fn patterns(&self, folder: &FolderId) -> Result<PatternList> {
        let mut loaded = self.lock()?;
        if let Some(list) = loaded.get(folder) {
            return Ok(list.clone());
        }
        let list = self.read_file(folder)?;
        loaded.insert(folder.clone(), list.clone());
        Ok(list)
    }

    fn add_pattern(&self, folder: &FolderId, text: &str) -> Result<Pattern> {
        let (path, negated) = self.syntax.parse_rule(text)?;
        self.edit(folder, |list| Ok(list.push(path, negated)))
    }

    fn remove_pattern(&self, folder: &FolderId, pattern: &Pattern) -> Result<()> {
        self.edit(folder, |list| Ok(list.remove(pattern)?))
    }

    fn load_text(&self, folder: &FolderId, text: &str) -> Result<()> {
        let parsed = self.syntax.parse(text);
        self.edit(folder, |list| {
            *list = parsed;
            Ok(())
        })
    }

    fn text(&self, folder: &FolderId) -> Result<String> {
        Ok(self.syntax.render(&self.patterns(folder)?))
    }
}
