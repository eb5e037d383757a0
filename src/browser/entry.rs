use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::CommandError;
use crate::services::file_ops::FileSystem;

/// One filesystem node as it was when its directory was listed.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    /// Unix permission bits, `None` where the platform has none.
    pub mode: Option<u32>,
}

impl Entry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory,
            size: 0,
            modified: None,
            mode: None,
        }
    }
}

/// Directories first, then case-insensitive name, then exact name so that
/// names differing only in case still get a stable order.
fn listing_order(a: &Entry, b: &Entry) -> Ordering {
    match (a.is_directory, b.is_directory) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Ordered entries of one directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryListing {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl DirectoryListing {
    pub fn new(path: impl Into<PathBuf>, mut entries: Vec<Entry>) -> Self {
        entries.sort_by(listing_order);
        Self {
            path: path.into(),
            entries,
        }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holds the listing of the directory currently on screen.
///
/// The listing is only ever replaced as a whole; a failed re-list keeps the
/// previous snapshot.
#[derive(Debug, Default)]
pub struct EntryStore {
    listing: DirectoryListing,
}

impl EntryStore {
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, CommandError> {
        Ok(Self {
            listing: fs.list_directory(path)?,
        })
    }

    pub fn reload(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<(), CommandError> {
        self.listing = fs.list_directory(path)?;
        Ok(())
    }

    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    pub fn entries(&self) -> &[Entry] {
        self.listing.entries()
    }

    pub fn len(&self) -> usize {
        self.listing.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.listing.is_empty()
    }
}
