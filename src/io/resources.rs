//! Content loaders used on import.
//!
//! Descriptors reference content by package-relative path. A loader resolves
//! such a path either against a directory on disk or against an in-memory
//! map (archive imports read every entry into a map up front).

use crate::{Error, Result};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

/// Resolves package-relative content references.
pub trait ResourceLoader {
    /// Loads the raw bytes stored under `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceLoad`] if the entry does not exist or cannot be
    /// read.
    fn load(&self, path: &str) -> Result<Vec<u8>>;

    /// Loads an entry as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceLoad`] if the entry cannot be loaded or is not
    /// valid UTF-8.
    fn load_text(&self, path: &str) -> Result<String> {
        String::from_utf8(self.load(path)?).map_err(|e| load_error(path, e))
    }
}

pub(crate) fn load_error(path: &str, cause: impl std::fmt::Display) -> Error {
    Error::ResourceLoad {
        path: path.to_string(),
        cause: cause.to_string(),
    }
}

/// Normalizes a package path to `/`-separated form without a leading slash.
pub(crate) fn normalize_entry_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").trim_start_matches('/').to_string()
}

/// Loads content from a package directory.
#[derive(Debug, Clone)]
pub struct DiskResourceLoader {
    root: PathBuf,
}

impl DiskResourceLoader {
    /// Creates a loader rooted at a package directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the package root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for DiskResourceLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        let relative = PathBuf::from(normalize_entry_path(path));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(load_error(path, "reference escapes the package root"));
        }

        std::fs::read(self.root.join(&relative)).map_err(|e| load_error(path, e))
    }
}

/// Loads content from an in-memory path → bytes map.
#[derive(Debug, Clone, Default)]
pub struct MapResourceLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MapResourceLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, path: impl AsRef<str>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Inserts an entry, replacing any previous one.
    pub fn insert(&mut self, path: impl AsRef<str>, bytes: impl Into<Vec<u8>>) {
        self.entries
            .insert(normalize_entry_path(path.as_ref()), bytes.into());
    }

    /// Reads every file entry of a zip archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the archive cannot be read.
    pub fn from_archive<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive =
            zip::ZipArchive::new(reader).map_err(|e| Error::operation("open_archive", e))?;
        let mut loader = Self::new();

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| Error::operation("read_archive_entry", e))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut buffer = Vec::new();
            entry
                .read_to_end(&mut buffer)
                .map_err(|e| Error::operation("read_archive_entry", e))?;
            loader.insert(name, buffer);
        }

        tracing::debug!(entries = loader.entries.len(), "Loaded archive into memory");
        Ok(loader)
    }

    /// Returns the stored paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLoader for MapResourceLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        self.entries
            .get(&normalize_entry_path(path))
            .cloned()
            .ok_or_else(|| load_error(path, "no such entry"))
    }
}
