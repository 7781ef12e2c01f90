//! Package sinks: where export entries land.
//!
//! | Sink | Target |
//! |------|--------|
//! | [`DirectorySink`] | Loose files under a root directory |
//! | [`ArchiveSink`] | Entries of a single deflate-compressed zip archive |

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Destination of package entries.
///
/// Entries are addressed by package-relative, `/`-separated paths. A sink
/// writes whatever it is handed; deduplication happens in the
/// [`ExportSession`](super::ExportSession) above it.
pub trait PackageSink {
    /// Writes one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Flushes and closes the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if finalization fails.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Writes entries as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Creates a sink rooted at `root`. The directory is created on demand.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PackageSink for DirectorySink {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::operation("create_package_dir", e))?;
        }
        std::fs::write(&target, bytes).map_err(|e| Error::operation("write_package_entry", e))
    }

    fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Writes entries into a zip archive.
pub struct ArchiveSink {
    writer: ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
}

impl ArchiveSink {
    /// Creates the archive file (and its parent directory).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::operation("create_archive_dir", e))?;
        }
        let file = File::create(path).map_err(|e| Error::operation("create_archive", e))?;

        Ok(Self {
            writer: ZipWriter::new(BufWriter::new(file)),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        })
    }
}

impl PackageSink for ArchiveSink {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        self.writer
            .start_file(path, self.options)
            .map_err(|e| Error::operation("start_archive_entry", e))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::operation("write_archive_entry", e))
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let mut inner = self
            .writer
            .finish()
            .map_err(|e| Error::operation("finish_archive", e))?;
        inner
            .flush()
            .map_err(|e| Error::operation("flush_archive", e))
    }
}

/// Returns `true` if `path` names a zip archive rather than a directory.
#[must_use]
pub fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}
