use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::browser::entry::{DirectoryListing, Entry};

/// Filesystem primitives the browser calls.
///
/// Implementations report failures as `io::Error`; callers never retry.
pub trait FileSystem {
    fn list_directory(&self, path: &Path) -> io::Result<DirectoryListing>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_recursive(&self, path: &Path) -> io::Result<()>;
    fn copy(&self, src: &Path, dest: &Path) -> io::Result<()>;
    fn create_directory(&self, path: &Path) -> io::Result<()>;
    fn create_empty_file(&self, path: &Path) -> io::Result<()>;
    fn rename(&self, old_path: &Path, new_path: &Path) -> io::Result<()>;
}

/// The local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list_directory(&self, path: &Path) -> io::Result<DirectoryListing> {
        list_directory(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_recursive(&self, path: &Path) -> io::Result<()> {
        // A symlink to a directory is removed as a link, never followed
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_symlink() {
            fs::remove_file(path)
        } else {
            fs::remove_dir_all(path)
        }
    }

    fn copy(&self, src: &Path, dest: &Path) -> io::Result<()> {
        copy_file(src, dest)
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        create_directory(path)
    }

    fn create_empty_file(&self, path: &Path) -> io::Result<()> {
        create_empty_file(path)
    }

    fn rename(&self, old_path: &Path, new_path: &Path) -> io::Result<()> {
        rename_file(old_path, new_path)
    }
}

/// Read a directory into a sorted listing.
///
/// Entries whose metadata cannot be read (e.g. a file removed while listing)
/// are skipped; failing to open the directory itself is an error.
pub fn list_directory(path: &Path) -> io::Result<DirectoryListing> {
    let mut entries = Vec::new();

    for dir_entry in fs::read_dir(path)? {
        let Ok(dir_entry) = dir_entry else {
            continue;
        };
        let entry_path = dir_entry.path();
        // Follow symlinks so a link to a directory can be entered,
        // fall back to the link itself when it dangles
        let Ok(metadata) = fs::metadata(&entry_path).or_else(|_| fs::symlink_metadata(&entry_path)) else {
            continue;
        };

        let is_directory = metadata.is_dir();

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode())
        };
        #[cfg(not(unix))]
        let mode = None;

        entries.push(Entry {
            name: dir_entry.file_name().to_string_lossy().to_string(),
            path: entry_path,
            is_directory,
            size: if is_directory { 0 } else { metadata.len() },
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            mode,
        });
    }

    Ok(DirectoryListing::new(path, entries))
}

/// True when anything occupies `path`, including a dangling symlink.
fn target_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copy a file or directory
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<()> {
    let src_metadata = fs::symlink_metadata(src)?;
    if target_exists(dest) {
        let same = match (src.canonicalize(), dest.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Source and destination are the same file",
            ));
        }
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Target already exists. Delete it first or choose a different name.",
        ));
    }

    // A symlink is copied as a link, whatever it points at
    if src_metadata.is_symlink() {
        #[cfg(unix)]
        {
            let link_target = fs::read_link(src)?;
            return std::os::unix::fs::symlink(&link_target, dest);
        }
        #[cfg(not(unix))]
        {
            if !src.is_file() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Cannot copy a symlink on this platform",
                ));
            }
        }
    }

    let resolved_src = src.canonicalize()?;

    // Device files, sockets and pipes cannot be copied meaningfully
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        let file_type = fs::metadata(src)?.file_type();
        if file_type.is_block_device()
            || file_type.is_char_device()
            || file_type.is_fifo()
            || file_type.is_socket()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot copy special file (device, socket, or pipe)",
            ));
        }
    }

    if src_metadata.is_dir() {
        // Copying a directory into itself would never terminate
        if let Some(dest_parent) = dest.parent().and_then(|p| p.canonicalize().ok()) {
            if dest_parent.starts_with(&resolved_src) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Cannot copy a directory into itself",
                ));
            }
        }
        copy_dir_recursive(src, dest)
    } else {
        fs::copy(src, dest)?;
        Ok(())
    }
}

/// Maximum recursion depth for directory copy
const MAX_COPY_DEPTH: usize = 256;

/// Copy directory recursively with symlink loop detection
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    let mut visited = HashSet::new();
    copy_dir_recursive_inner(src, dest, &mut visited, 0)
}

fn copy_dir_recursive_inner(
    src: &Path,
    dest: &Path,
    visited: &mut HashSet<PathBuf>,
    depth: usize,
) -> io::Result<()> {
    if depth > MAX_COPY_DEPTH {
        return Err(io::Error::other(format!(
            "Maximum directory depth ({}) exceeded - possible circular symlink",
            MAX_COPY_DEPTH
        )));
    }

    let canonical_src = src.canonicalize().unwrap_or_else(|_| src.to_path_buf());
    if !visited.insert(canonical_src) {
        return Err(io::Error::other(format!(
            "Circular symlink detected: {}",
            src.display()
        )));
    }

    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        let metadata = fs::symlink_metadata(&src_path)?;

        if metadata.is_symlink() {
            #[cfg(unix)]
            {
                let link_target = fs::read_link(&src_path)?;
                std::os::unix::fs::symlink(&link_target, &dest_path)?;
            }
            #[cfg(not(unix))]
            {
                if src_path.is_file() {
                    fs::copy(&src_path, &dest_path)?;
                }
            }
        } else if metadata.is_dir() {
            copy_dir_recursive_inner(&src_path, &dest_path, visited, depth + 1)?;
        } else {
            fs::copy(&src_path, &dest_path)?;
        }
    }

    Ok(())
}

/// Create a new directory
pub fn create_directory(path: &Path) -> io::Result<()> {
    if target_exists(path) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Directory already exists",
        ));
    }

    fs::create_dir_all(path)
}

/// Create an empty file, failing if anything already has that name
pub fn create_empty_file(path: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(())
}

/// Rename a file or directory
pub fn rename_file(old_path: &Path, new_path: &Path) -> io::Result<()> {
    if target_exists(new_path) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Target already exists",
        ));
    }

    fs::rename(old_path, new_path)
}

/// Maximum filename length (POSIX limit)
const MAX_FILENAME_LENGTH: usize = 255;

/// Validate a name typed into a form before it is joined to the current path.
///
/// Emptiness is checked by the commands themselves, each with its own error.
pub fn is_valid_filename(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Filename cannot be blank");
    }

    if name.contains('/') || name.contains('\\') {
        return Err("Filename cannot contain path separators");
    }

    if name.contains('\0') {
        return Err("Filename cannot contain null bytes");
    }

    if name == "." || name == ".." {
        return Err("Invalid filename");
    }

    if name.len() > MAX_FILENAME_LENGTH {
        return Err("Filename too long (max 255 characters)");
    }

    if name.chars().any(|c| c.is_control()) {
        return Err("Filename cannot contain control characters");
    }

    Ok(())
}
