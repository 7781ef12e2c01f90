//! Component export service.
//!
//! Exposes the single-entity touchpoints used by the surrounding HTTP/CLI
//! layer and the batch package export.

use crate::io::converter::remove_component_files;
use crate::io::descriptors::Descriptor;
use crate::io::manifest::{MANIFEST_PATH, PackageManifest};
use crate::io::registry::ConverterRegistry;
use crate::io::session::ExportSession;
use crate::models::{Component, ComponentKind};
use crate::Result;
use crate::storage::ComponentStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for a batch package export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Kinds to export. Empty means every registered kind.
    pub kinds: Vec<ComponentKind>,
    /// Only export entities of this organization (privileges are global and
    /// always included).
    pub organization_id: Option<i64>,
    /// Abort on the first failing entity instead of reporting it.
    pub fail_fast: bool,
}

impl ExportOptions {
    /// Restricts the export to the given kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Restricts the export to one organization.
    #[must_use]
    pub const fn with_organization(mut self, organization_id: i64) -> Self {
        self.organization_id = Some(organization_id);
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

    fn includes(&self, component: &Component) -> bool {
        match (self.organization_id, component.kind()) {
            (None, _) | (_, ComponentKind::Privilege) => true,
            (Some(org), _) => component.organization_id() == Some(org),
        }
    }
}

/// An entity that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    /// Kind of the entity.
    pub kind: ComponentKind,
    /// Rendered natural key of the entity.
    pub key: String,
    /// Error message.
    pub error: String,
}

/// Result of a batch package export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Package location.
    pub target: PathBuf,
    /// Entities exported per kind.
    pub exported: BTreeMap<ComponentKind, usize>,
    /// Package entries written, manifest included.
    pub entries_written: usize,
    /// Writes skipped because the entry was already in the package.
    pub duplicates_skipped: usize,
    /// Content files skipped because the entity's content was empty.
    pub missing_content: usize,
    /// Entities that failed.
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    /// Total number of exported entities.
    #[must_use]
    pub fn total_exported(&self) -> usize {
        self.exported.values().sum()
    }

    /// Returns whether every entity was exported.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Service for exporting components into packages.
pub struct ExportService {
    registry: Arc<ConverterRegistry>,
    store: Arc<dyn ComponentStore>,
}

impl ExportService {
    /// Creates a new export service.
    #[must_use]
    pub fn new(registry: Arc<ConverterRegistry>, store: Arc<dyn ComponentStore>) -> Self {
        Self { registry, store }
    }

    /// Writes one entity into an open session and returns its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnrecognizedType`] if no converter handles the
    /// entity's kind, or the converter's error.
    pub fn export_entity(
        &self,
        component: &Component,
        session: &mut ExportSession,
    ) -> Result<Descriptor> {
        let converter = self.registry.for_component(component)?;
        let descriptor = converter.export_component(component, session)?;
        metrics::counter!("compack_components_exported_total", "kind" => component.kind().as_str())
            .increment(1);
        Ok(descriptor)
    }

    /// Writes one entity as loose files under `root`, in a session of its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity cannot be converted or written.
    pub fn export_to_file(&self, component: &Component, root: &Path) -> Result<Descriptor> {
        let mut session = ExportSession::directory(root);
        let descriptor = self.export_entity(component, &mut session)?;
        let stats = session.finish()?;
        tracing::info!(
            kind = %component.kind(),
            key = %component.natural_key(),
            entries = stats.entries_written,
            root = %root.display(),
            "Exported component"
        );
        Ok(descriptor)
    }

    /// Removes the files an entity occupies under `root`.
    ///
    /// Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// Returns an error if no converter handles the entity's kind or a file
    /// cannot be removed.
    pub fn remove_exported_files(&self, component: &Component, root: &Path) -> Result<usize> {
        let paths = self.registry.for_component(component)?.entry_paths(component)?;
        let removed = remove_component_files(root, &paths)?;
        tracing::info!(
            kind = %component.kind(),
            key = %component.natural_key(),
            removed,
            "Removed exported component files"
        );
        Ok(removed)
    }

    /// Exports every stored component selected by `options` into a package
    /// at `target`: a zip archive when it ends in `.zip`, otherwise a
    /// directory.
    ///
    /// Kinds are exported in dependency order. Endpoints already written
    /// through their resource are skipped by the session's dedup set.
    ///
    /// # Errors
    ///
    /// Returns an error if the package cannot be created or finalized, or the
    /// first entity failure when `fail_fast` is set.
    pub fn export_package(&self, target: &Path, options: &ExportOptions) -> Result<ExportReport> {
        let mut session = ExportSession::open(target)?;
        let mut report = ExportReport {
            target: target.to_path_buf(),
            ..ExportReport::default()
        };

        for kind in self.registry.export_kinds() {
            if !options.includes_kind(kind) {
                continue;
            }

            for component in self.store.list(kind)? {
                if !options.includes(&component) {
                    continue;
                }

                match self.export_entity(&component, &mut session) {
                    Ok(_) => *report.exported.entry(kind).or_default() += 1,
                    Err(e) if options.fail_fast => return Err(e),
                    Err(e) => {
                        metrics::counter!("compack_component_failures_total", "direction" => "export")
                            .increment(1);
                        tracing::warn!(
                            kind = %kind,
                            key = %component.natural_key(),
                            error = %e,
                            "Failed to export component"
                        );
                        report.failures.push(ExportFailure {
                            kind,
                            key: component.natural_key(),
                            error: e.to_string(),
                        });
                    },
                }
            }
        }

        let manifest = PackageManifest::new(report.exported.clone());
        session.write_once(
            MANIFEST_PATH,
            manifest.to_yaml()?.as_bytes(),
            "package manifest",
        )?;

        let stats = session.finish()?;
        report.entries_written = stats.entries_written;
        report.duplicates_skipped = stats.duplicates_skipped;
        report.missing_content = stats.missing_content;

        tracing::info!(
            target = %target.display(),
            exported = report.total_exported(),
            entries = report.entries_written,
            duplicates = report.duplicates_skipped,
            failures = report.failures.len(),
            "Package export complete"
        );
        Ok(report)
    }
}
