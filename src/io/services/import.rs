//! Component import service.
//!
//! Single-descriptor import for the surrounding HTTP/CLI layer, and batch
//! import of a whole package in dependency order.

use crate::io::descriptors::Descriptor;
use crate::io::manifest::{MANIFEST_PATH, PackageManifest};
use crate::io::package::is_archive_path;
use crate::io::path_codec::{METADATA_EXTENSION, METADATA_ROOT};
use crate::io::registry::ConverterRegistry;
use crate::io::resources::{DiskResourceLoader, MapResourceLoader, ResourceLoader};
use crate::models::{Component, ComponentKind};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Options for a batch package import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Kinds to import. Empty means every kind found in the package.
    pub kinds: Vec<ComponentKind>,
    /// Abort on the first failing document instead of reporting it.
    pub fail_fast: bool,
}

impl ImportOptions {
    /// Restricts the import to the given kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Enables or disables fail-fast mode.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    fn includes_kind(&self, kind: ComponentKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// A metadata document that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Package-relative path of the document.
    pub path: String,
    /// Kind of the document, if its category was recognized.
    pub kind: Option<ComponentKind>,
    /// Error message.
    pub error: String,
}

/// Result of a batch package import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Package location.
    pub source: PathBuf,
    /// Manifest found at the package root, if any.
    pub manifest: Option<PackageManifest>,
    /// Documents imported per kind.
    pub imported: BTreeMap<ComponentKind, usize>,
    /// Documents that failed.
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Total number of imported documents.
    #[must_use]
    pub fn total_imported(&self) -> usize {
        self.imported.values().sum()
    }

    /// Returns whether every document was imported.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Service for importing components from packages.
pub struct ImportService {
    registry: Arc<ConverterRegistry>,
    package_root: PathBuf,
}

impl ImportService {
    /// Creates a new import service resolving content against the current
    /// directory by default.
    #[must_use]
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            package_root: PathBuf::from("."),
        }
    }

    /// Sets the package root used when no resource loader is supplied.
    #[must_use]
    pub fn with_package_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.package_root = root.into();
        self
    }

    /// Imports one descriptor read from `path`.
    ///
    /// Content references are resolved through `resources`, or against the
    /// service's package root when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if no converter handles the
    /// descriptor's kind, or the converter's error.
    pub fn import_descriptor(
        &self,
        descriptor: Descriptor,
        path: &str,
        resources: Option<&dyn ResourceLoader>,
    ) -> Result<Component> {
        let converter = self.registry.for_descriptor(&descriptor)?;
        let component = match resources {
            Some(loader) => converter.import_descriptor(descriptor, path, loader)?,
            None => {
                let loader = DiskResourceLoader::new(&self.package_root);
                converter.import_descriptor(descriptor, path, &loader)?
            },
        };
        metrics::counter!("compack_components_imported_total", "kind" => component.kind().as_str())
            .increment(1);
        Ok(component)
    }

    /// Imports every metadata document of the package at `source`, a
    /// directory or a zip archive.
    ///
    /// Documents are imported in dependency order (privileges, forms,
    /// resources, endpoints, listeners, schedulers) and by path within a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the package cannot be read or its manifest names a
    /// newer format, or the first document failure when `fail_fast` is set.
    pub fn import_package(&self, source: &Path, options: &ImportOptions) -> Result<ImportReport> {
        let package = Package::open(source)?;
        let manifest = package
            .read_manifest()?
            .map(|yaml| PackageManifest::from_yaml(&yaml))
            .transpose()?;

        let mut report = ImportReport {
            source: source.to_path_buf(),
            manifest,
            ..ImportReport::default()
        };

        let mut documents: Vec<(Option<ComponentKind>, String)> = package
            .documents
            .iter()
            .map(|path| (document_kind(path), path.clone()))
            .filter(|(kind, _)| kind.is_none_or(|k| options.includes_kind(k)))
            .collect();
        // Unrecognized categories go last so they never block real imports.
        documents.sort_by(|(a_kind, a_path), (b_kind, b_path)| {
            (a_kind.is_none(), a_kind, a_path).cmp(&(b_kind.is_none(), b_kind, b_path))
        });

        for (kind, path) in documents {
            match self.import_document(kind, &path, package.loader.as_ref()) {
                Ok(component) => *report.imported.entry(component.kind()).or_default() += 1,
                Err(e) if options.fail_fast => return Err(e),
                Err(e) => {
                    metrics::counter!("compack_component_failures_total", "direction" => "import")
                        .increment(1);
                    tracing::warn!(path = %path, error = %e, "Failed to import document");
                    report.failures.push(ImportFailure {
                        path,
                        kind,
                        error: e.to_string(),
                    });
                },
            }
        }

        tracing::info!(
            source = %source.display(),
            imported = report.total_imported(),
            failures = report.failures.len(),
            "Package import complete"
        );
        Ok(report)
    }

    fn import_document(
        &self,
        kind: Option<ComponentKind>,
        path: &str,
        loader: &dyn ResourceLoader,
    ) -> Result<Component> {
        let kind = kind.ok_or_else(|| {
            Error::UnrecognizedType(format!("no component kind for document '{path}'"))
        })?;
        let yaml = loader.load_text(path)?;
        let descriptor = Descriptor::from_yaml(kind, &yaml)?;
        self.import_descriptor(descriptor, path, Some(loader))
    }
}

/// Kind of a metadata document, from the category segment after `config/`.
fn document_kind(path: &str) -> Option<ComponentKind> {
    path.split('/').nth(1).and_then(ComponentKind::parse)
}

/// An opened package: where its entries come from and which are metadata
/// documents.
struct Package {
    loader: Box<dyn ResourceLoader>,
    documents: Vec<String>,
    has_manifest: bool,
}

impl Package {
    fn open(source: &Path) -> Result<Self> {
        if is_archive_path(source) {
            Self::open_archive(source)
        } else if source.is_dir() {
            Self::open_directory(source)
        } else {
            Err(Error::InvalidInput(format!(
                "package not found: {}",
                source.display()
            )))
        }
    }

    fn open_archive(source: &Path) -> Result<Self> {
        let file = File::open(source).map_err(|e| Error::operation("open_package_archive", e))?;
        let loader = MapResourceLoader::from_archive(BufReader::new(file))?;
        let documents = loader
            .paths()
            .into_iter()
            .filter(|path| is_metadata_document(path))
            .map(str::to_string)
            .collect();
        let has_manifest = loader.paths().contains(&MANIFEST_PATH);
        Ok(Self {
            loader: Box::new(loader),
            documents,
            has_manifest,
        })
    }

    fn open_directory(source: &Path) -> Result<Self> {
        let config_dir = source.join(METADATA_ROOT);
        let mut documents = Vec::new();
        if config_dir.is_dir() {
            for entry in WalkDir::new(&config_dir).follow_links(false) {
                let entry = entry.map_err(|e| Error::operation("walk_package", e))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(source) else {
                    continue;
                };
                let path = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if is_metadata_document(&path) {
                    documents.push(path);
                }
            }
        }
        Ok(Self {
            loader: Box::new(DiskResourceLoader::new(source)),
            documents,
            has_manifest: source.join(MANIFEST_PATH).is_file(),
        })
    }

    fn read_manifest(&self) -> Result<Option<String>> {
        if self.has_manifest {
            self.loader.load_text(MANIFEST_PATH).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn is_metadata_document(path: &str) -> bool {
    path.strip_prefix(METADATA_ROOT)
        .is_some_and(|rest| rest.starts_with('/'))
        && Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(METADATA_EXTENSION))
}
