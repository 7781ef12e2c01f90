//! Component export/import subsystem.
//!
//! Converts stored components into package entries and back.
//!
//! # Architecture
//!
//! - **Path codec** ([`PathCodec`]) maps an entity's access scope,
//!   organization and name to a package path and parses it back
//! - **Converters** (one per kind, [`ComponentConverter`]) compute paths,
//!   build descriptors and rebuild entities with lookup-or-create
//! - **Registry** ([`ConverterRegistry`]) maps each kind to its converter,
//!   separately per direction
//! - **Session** ([`ExportSession`]) carries one package writer and the set of
//!   paths already written, so shared entries are written once
//! - **Services** orchestrate single-entity and whole-package operations
//!
//! # Package layout
//!
//! | Entry | Path |
//! |-------|------|
//! | Metadata document | `config/<category>/[<scope>/][org_<id>/]<name>.yaml` |
//! | UI resource content | `resources/resource/<scope>/[org_<id>/]<name>.<ext>` |
//! | Endpoint script | `code/endpoint/<scope>/[org_<id>/]<resource>-<METHOD>-<sub-path>.js` |
//! | Form script | `code/form/[org_<id>/]<name>.js` |
//! | Manifest | `manifest.yaml` |
//!
//! # Example
//!
//! ```rust,ignore
//! use compack::io::{ExportOptions, ExportService};
//!
//! let report = exporter.export_package(Path::new("bundle.zip"), &ExportOptions::default())?;
//! tracing::info!(exported = report.total_exported(), "done");
//! ```

pub mod converter;
pub mod converters;
pub mod descriptors;
pub mod manifest;
pub mod package;
pub mod path_codec;
pub mod registry;
pub mod resources;
pub mod services;
pub mod session;

pub use converter::{ComponentConverter, DynConverter, EntryPaths};
pub use descriptors::{ComponentDescriptor, Descriptor, DescriptorType};
pub use manifest::PackageManifest;
pub use package::{ArchiveSink, DirectorySink, PackageSink};
pub use path_codec::{DecodedPath, PathCodec};
pub use registry::ConverterRegistry;
pub use resources::{DiskResourceLoader, MapResourceLoader, ResourceLoader};
pub use services::{
    ExportFailure, ExportOptions, ExportReport, ExportService, ImportFailure, ImportOptions,
    ImportReport, ImportService,
};
pub use session::{ExportSession, SessionStats};
