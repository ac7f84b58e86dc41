//! File-system primitives for stage outputs
//!
//! Every output is regenerated from scratch: a destination directory or
//! file is removed before it is written again, so repeated runs converge
//! on the same tree.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Could not create the folder {}", .path.display())]
    DirectoryCreate { path: PathBuf, source: io::Error },

    #[error("Could not delete the folder {}", .path.display())]
    DirectoryRemove { path: PathBuf, source: io::Error },

    #[error("Could not write {}", .path.display())]
    FileWrite { path: PathBuf, source: io::Error },

    #[error("Could not delete the existing file {}", .path.display())]
    FileRemove { path: PathBuf, source: io::Error },

    #[error("The specified file does not exist: {}", .path.display())]
    FileRead { path: PathBuf, source: io::Error },

    #[error("Refusing to replace {}, it is outside {}", .path.display(), .base.display())]
    OutsideOutput { path: PathBuf, base: PathBuf },
}

impl FsError {
    /// Returns the error kind name
    pub fn kind(&self) -> &'static str {
        match self {
            FsError::DirectoryCreate { .. } => "DirectoryCreateFailed",
            FsError::DirectoryRemove { .. } | FsError::OutsideOutput { .. } => {
                "DirectoryRemoveFailed"
            }
            FsError::FileWrite { .. } => "FileWriteFailed",
            FsError::FileRemove { .. } => "FileRemoveFailed",
            FsError::FileRead { .. } => "SourceFileNotFound",
        }
    }
}

/// Checks that `path` names an entry strictly below `base`
///
/// Outputs are removed before they are rewritten, so a path that climbs out
/// of its output directory is rejected before anything touches the disk.
pub fn ensure_within(base: &Path, path: &Path) -> Result<(), FsError> {
    let inside = path.strip_prefix(base).is_ok_and(|rest| {
        rest.components().next().is_some()
            && rest.components().all(|c| matches!(c, Component::Normal(_)))
    });

    if inside {
        Ok(())
    } else {
        Err(FsError::OutsideOutput {
            path: path.to_path_buf(),
            base: base.to_path_buf(),
        })
    }
}

/// Creates a directory and its parents
pub fn ensure_dir(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).map_err(|source| FsError::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes a directory tree if it exists
pub fn remove_dir(path: &Path) -> Result<(), FsError> {
    if !path.exists() {
        return Ok(());
    }

    fs::remove_dir_all(path).map_err(|source| FsError::DirectoryRemove {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes a directory tree and creates it again empty
pub fn recreate_dir(path: &Path) -> Result<(), FsError> {
    remove_dir(path)?;
    ensure_dir(path)
}

/// Removes a file if it exists
pub fn remove_file(path: &Path) -> Result<(), FsError> {
    if !path.exists() {
        return Ok(());
    }

    fs::remove_file(path).map_err(|source| FsError::FileRemove {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a source file to a string
pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    fs::read_to_string(path).map_err(|source| FsError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces a file with new contents, creating its parent directory
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    remove_file(path)?;

    fs::write(path, contents).map_err(|source| FsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces `dest` with a copy of `source`
pub fn copy_file(source: &Path, dest: &Path) -> Result<(), FsError> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    remove_file(dest)?;

    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|err| FsError::FileWrite {
            path: dest.to_path_buf(),
            source: err,
        })
}

/// Replaces `dest` with a recursive copy of the `source` directory
pub fn copy_tree(source: &Path, dest: &Path) -> Result<(), FsError> {
    remove_dir(dest)?;
    copy_tree_into(source, dest)
}

fn copy_tree_into(source: &Path, dest: &Path) -> Result<(), FsError> {
    ensure_dir(dest)?;

    for entry in read_dir_sorted(source, dest)? {
        let target = dest.join(entry.file_name().unwrap_or_default());
        if entry.is_dir() {
            copy_tree_into(&entry, &target)?;
        } else {
            copy_file(&entry, &target)?;
        }
    }

    Ok(())
}

/// Lists a directory's entries in name order
///
/// A read failure is reported against `dest`, the output that could not be
/// produced.
pub fn read_dir_sorted(dir: &Path, dest: &Path) -> Result<Vec<PathBuf>, FsError> {
    let entries = fs::read_dir(dir).map_err(|source| FsError::FileWrite {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| FsError::FileWrite {
            path: dest.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    Ok(paths)
}
