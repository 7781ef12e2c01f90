//! Export session: one writer, one dedup set.

use super::package::{ArchiveSink, DirectorySink, PackageSink, is_archive_path};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Counters collected while a session writes entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Entries written to the sink.
    pub entries_written: usize,
    /// Writes skipped because the path was already written.
    pub duplicates_skipped: usize,
    /// Content files skipped because the entity's content was empty.
    pub missing_content: usize,
}

/// Who wrote a path, and a digest of what was written.
#[derive(Debug)]
struct WrittenEntry {
    owner: String,
    digest: Vec<u8>,
}

/// State of a single export: the sink plus the set of paths already written.
///
/// Every converter call of one export receives the same session by mutable
/// reference, so a path shared by several entities (a script reused by two
/// endpoints, an endpoint reached both through its resource and on its own)
/// is written exactly once. A second write to a path must carry identical
/// bytes. A session has exactly one writer; two sessions must not target the
/// same archive.
pub struct ExportSession {
    sink: Box<dyn PackageSink>,
    written: HashMap<String, WrittenEntry>,
    missing: HashSet<String>,
    stats: SessionStats,
}

impl ExportSession {
    /// Creates a session over any sink.
    #[must_use]
    pub fn new(sink: Box<dyn PackageSink>) -> Self {
        Self {
            sink,
            written: HashMap::new(),
            missing: HashSet::new(),
            stats: SessionStats::default(),
        }
    }

    /// Creates a session writing loose files under `root`.
    #[must_use]
    pub fn directory(root: &Path) -> Self {
        Self::new(Box::new(DirectorySink::new(root)))
    }

    /// Creates a session writing a zip archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be created.
    pub fn archive(path: &Path) -> Result<Self> {
        Ok(Self::new(Box::new(ArchiveSink::create(path)?)))
    }

    /// Opens a session for `target`: an archive when it ends in `.zip`,
    /// otherwise a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be created.
    pub fn open(target: &Path) -> Result<Self> {
        if is_archive_path(target) {
            Self::archive(target)
        } else {
            Ok(Self::directory(target))
        }
    }

    /// Returns `true` if `path` was already written in this session.
    #[must_use]
    pub fn is_written(&self, path: &str) -> bool {
        self.written.contains_key(path)
    }

    /// Writes an entry on behalf of `owner` unless its path was already
    /// written with the same bytes.
    ///
    /// Returns `true` if the entry was written, `false` if it was skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the path was already written with
    /// different bytes, naming both owners. Returns an error if the sink
    /// fails; the path is not marked as written in that case.
    pub fn write_once(&mut self, path: &str, bytes: &[u8], owner: &str) -> Result<bool> {
        let digest = Sha256::digest(bytes).to_vec();
        if let Some(previous) = self.written.get(path) {
            if previous.digest != digest {
                return Err(Error::InvalidInput(format!(
                    "package path '{path}' is claimed by both {} and {owner}",
                    previous.owner
                )));
            }
            self.stats.duplicates_skipped += 1;
            metrics::counter!("compack_entries_deduplicated_total").increment(1);
            tracing::debug!(path, "Skipping entry already written in this session");
            return Ok(false);
        }

        self.sink.write_entry(path, bytes)?;
        self.written.insert(
            path.to_string(),
            WrittenEntry {
                owner: owner.to_string(),
                digest,
            },
        );
        self.stats.entries_written += 1;
        metrics::counter!("compack_entries_written_total").increment(1);
        Ok(true)
    }

    /// Records a content file skipped because the entity had no content.
    ///
    /// Each path is counted once per session.
    pub fn record_missing_content(&mut self, path: &str) {
        if self.missing.insert(path.to_string()) {
            self.stats.missing_content += 1;
            tracing::warn!(path, "Entity has empty content; content file not written");
        }
    }

    /// Returns the counters so far.
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Returns the paths written so far, sorted.
    #[must_use]
    pub fn written_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.written.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Finalizes the sink and returns the counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be finalized.
    pub fn finish(self) -> Result<SessionStats> {
        self.sink.finish()?;
        Ok(self.stats)
    }
}

impl fmt::Debug for ExportSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportSession")
            .field("written", &self.written.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
