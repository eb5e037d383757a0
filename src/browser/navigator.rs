use std::path::{Path, PathBuf};

use super::entry::{Entry, EntryStore};
use super::history::{HistoryEntry, HistoryLog};
use super::selection::SelectionMemory;
use crate::error::CommandError;
use crate::services::file_ops::FileSystem;

/// Table rows above the first entry.
pub const HEADER_ROWS: usize = 1;

/// Row of the first entry, used when a directory has no remembered row.
pub const FIRST_ROW: usize = HEADER_ROWS;

/// Clamp a table row to a listing of `len` entries.
///
/// An empty listing only has the header row. Otherwise the row is kept
/// between the first and the last entry.
pub fn clamp_row(row: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        row.clamp(FIRST_ROW, len + HEADER_ROWS - 1)
    }
}

/// Tracks where the browser is and what is selected there.
///
/// Rows are table rows: row 0 is the header, entry `i` lives on row
/// `i + HEADER_ROWS`.
#[derive(Debug)]
pub struct Navigator {
    current: PathBuf,
    store: EntryStore,
    row: usize,
    scroll_offset: usize,
    memory: SelectionMemory,
    history: HistoryLog,
}

impl Navigator {
    pub fn open(fs: &dyn FileSystem, path: &Path, history_depth: usize) -> Result<Self, CommandError> {
        let store = EntryStore::load(fs, path)?;
        let row = clamp_row(FIRST_ROW, store.len());
        let mut history = HistoryLog::with_capacity(history_depth);
        history.save(row, path.to_path_buf());

        Ok(Self {
            current: path.to_path_buf(),
            store,
            row,
            scroll_offset: 0,
            memory: SelectionMemory::new(),
            history,
        })
    }

    pub fn current_path(&self) -> &Path {
        &self.current
    }

    pub fn entries(&self) -> &[Entry] {
        self.store.entries()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Rows in the table including the header.
    pub fn row_count(&self) -> usize {
        self.store.len() + HEADER_ROWS
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
    }

    #[allow(dead_code)]
    pub fn memory(&self) -> &SelectionMemory {
        &self.memory
    }

    #[allow(dead_code)]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The entry on the active row, `None` on the header or in an empty
    /// directory.
    pub fn current_selection(&self) -> Option<&Entry> {
        self.row
            .checked_sub(HEADER_ROWS)
            .and_then(|index| self.store.listing().get(index))
    }

    pub fn select_row(&mut self, row: usize) {
        self.row = clamp_row(row, self.store.len());
    }

    pub fn move_selection(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.row.saturating_sub(delta.unsigned_abs())
        } else {
            self.row.saturating_add(delta as usize)
        };
        self.select_row(target);
    }

    pub fn select_first(&mut self) {
        self.select_row(FIRST_ROW);
    }

    pub fn select_last(&mut self) {
        self.select_row(self.row_count().saturating_sub(1));
    }

    /// Enter `entry` if it is a directory. Returns `Ok(false)` for files.
    ///
    /// The child is listed before any state changes, so a directory that
    /// cannot be read leaves the browser where it was.
    pub fn enter_child(&mut self, fs: &dyn FileSystem, entry: &Entry) -> Result<bool, CommandError> {
        if !entry.is_directory {
            return Ok(false);
        }

        let store = EntryStore::load(fs, &entry.path)?;
        self.memory.remember(&self.current, self.row);
        self.arrive(entry.path.clone(), store);
        tracing::debug!(path = %self.current.display(), row = self.row, "entered directory");
        Ok(true)
    }

    /// Move to the parent directory. Returns `Ok(false)` at the root.
    pub fn go_to_parent(&mut self, fs: &dyn FileSystem) -> Result<bool, CommandError> {
        let Some(parent) = self.current.parent() else {
            return Ok(false);
        };
        if parent.as_os_str().is_empty() {
            return Ok(false);
        }
        let parent = parent.to_path_buf();

        let store = EntryStore::load(fs, &parent)?;
        self.memory.remember(&self.current, self.row);
        self.arrive(parent, store);
        tracing::debug!(path = %self.current.display(), row = self.row, "moved to parent");
        Ok(true)
    }

    /// Jump to an arbitrary directory, e.g. one typed into the path box.
    pub fn go_to(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<(), CommandError> {
        let store = EntryStore::load(fs, path)?;
        self.arrive(path.to_path_buf(), store);
        tracing::debug!(path = %self.current.display(), row = self.row, "jumped to path");
        Ok(())
    }

    /// Re-list the current directory and re-clamp the row.
    pub fn refresh(&mut self, fs: &dyn FileSystem) -> Result<(), CommandError> {
        self.store.reload(fs, &self.current)?;
        self.row = clamp_row(self.row, self.store.len());
        Ok(())
    }

    pub fn history_back(&mut self, fs: &dyn FileSystem) -> Result<bool, CommandError> {
        let Some(entry) = self.history.previous().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.visit(fs, &entry) {
            self.history.next();
            return Err(e);
        }
        Ok(true)
    }

    pub fn history_forward(&mut self, fs: &dyn FileSystem) -> Result<bool, CommandError> {
        let Some(entry) = self.history.next().cloned() else {
            return Ok(false);
        };
        if let Err(e) = self.visit(fs, &entry) {
            self.history.previous();
            return Err(e);
        }
        Ok(true)
    }

    fn visit(&mut self, fs: &dyn FileSystem, entry: &HistoryEntry) -> Result<(), CommandError> {
        let store = EntryStore::load(fs, &entry.path)?;
        self.current = entry.path.clone();
        self.store = store;
        self.row = clamp_row(entry.row, self.store.len());
        self.scroll_offset = 0;
        Ok(())
    }

    fn arrive(&mut self, path: PathBuf, store: EntryStore) {
        self.current = path;
        self.store = store;
        self.scroll_offset = 0;
        let remembered = self.memory.recall(&self.current).unwrap_or(FIRST_ROW);
        self.row = clamp_row(remembered, self.store.len());
        self.history.save(self.row, self.current.clone());
    }
}
