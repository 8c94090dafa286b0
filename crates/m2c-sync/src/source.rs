//! Document discovery and reading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Ordered supply of documents.
pub trait DocumentSource: Send + Sync {
    /// Document identifiers in processing order.
    fn list(&self) -> Vec<String>;

    /// Read the raw bytes of a document.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the document can't be read.
    fn read(&self, id: &str) -> std::io::Result<Vec<u8>>;
}

/// Markdown files discovered on the local filesystem.
///
/// Identifiers are the display form of file paths as given or as joined
/// while walking. Reads go through the stored path, so names that are not
/// valid UTF-8 still read back.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    files: Vec<PathBuf>,
}

impl FsSource {
    /// Discover markdown files under `paths`.
    ///
    /// A regular file is included as given, regardless of extension. A
    /// directory contributes its `.md` files (case-insensitive), descending
    /// into subdirectories only when `recursive` is set. Entries are sorted
    /// per directory and duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Access`] if a path doesn't exist or a
    /// directory can't be listed.
    pub fn discover(paths: &[PathBuf], recursive: bool) -> Result<Self, SourceError> {
        let mut files = Vec::new();
        for path in paths {
            let metadata = fs::metadata(path).map_err(|error| SourceError::Access {
                path: path.clone(),
                error,
            })?;
            if metadata.is_dir() {
                scan_directory(path, recursive, &mut files)?;
            } else {
                files.push(path.clone());
            }
        }

        let mut seen = std::collections::HashSet::new();
        files.retain(|f| seen.insert(f.clone()));
        Ok(Self { files })
    }

    /// Discovered file paths in processing order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn scan_directory(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let access = |error| SourceError::Access {
        path: dir.to_path_buf(),
        error,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(access)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(access)?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if recursive {
                scan_directory(&path, recursive, files)?;
            }
        } else if is_markdown(&path) {
            files.push(path);
        }
    }
    Ok(())
}

impl DocumentSource for FsSource {
    fn list(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    fn read(&self, id: &str) -> std::io::Result<Vec<u8>> {
        let path = self
            .files
            .iter()
            .find(|p| p.to_string_lossy() == id)
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("{id}: not discovered"))
            })?;
        fs::read(path)
    }
}
