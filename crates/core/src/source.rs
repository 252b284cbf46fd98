//! Source provider abstraction for filesystem-independent compilation.
//!
//! The [`SourceProvider`] trait abstracts file I/O so batches can be parsed
//! from disk or from an in-memory map (tests, embedding).

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extension of Jack compilation units.
pub const JACK_EXTENSION: &str = "jack";

/// Trait that abstracts file I/O for the batch driver.
pub trait SourceProvider {
    /// Read the full source text of one unit.
    fn read_source(&self, path: &Path) -> Result<String, io::Error>;

    /// Whether `path` names a directory of units.
    fn is_dir(&self, path: &Path) -> bool;

    /// `.jack` files directly inside `dir`, sorted by file name.
    fn list_units(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error>;
}

/// Whether `path` has the `.jack` extension.
pub fn is_jack_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(JACK_EXTENSION)
}

/// Filesystem-backed source provider.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, io::Error> {
        std::fs::read_to_string(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_units(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let mut units = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_jack_file(&path) {
                units.push(path);
            }
        }
        units.sort();
        Ok(units)
    }
}

/// In-memory source provider for testing.
///
/// Maps paths to source text. Directories exist implicitly as prefixes of
/// stored paths.
pub struct InMemoryProvider {
    files: BTreeMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new<I, P, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(p, s)| (Self::normalize_path(&p.into()), s.into()))
                .collect(),
        }
    }

    /// Resolve `.` and `..` components without touching the filesystem.
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        !self.files.contains_key(&normalized)
            && self.files.keys().any(|k| k.starts_with(&normalized))
    }

    fn list_units(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let dir = Self::normalize_path(dir);
        if !self.is_dir(&dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found in memory: {}", dir.display()),
            ));
        }
        // BTreeMap keys are already in order.
        Ok(self
            .files
            .keys()
            .filter(|k| k.parent() == Some(dir.as_path()) && is_jack_file(k))
            .cloned()
            .collect())
    }
}
