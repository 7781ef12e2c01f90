//! # Compack
//!
//! Packages runtime-configurable application components into portable,
//! versionable bundles and reconstructs them in another environment.
//!
//! Supported component kinds:
//!
//! - UI resources (pages and API-bound components), with their endpoints
//! - HTTP-triggered script endpoints
//! - Dynamic form/table definitions
//! - Event listeners
//! - Schedulers
//! - Access-control privileges
//!
//! ## Package layout
//!
//! ```text
//! manifest.yaml
//! config/<category>/[<access-scope>/][org_<id>/]<name>.yaml   # one descriptor per entity
//! resources/resource/<access-scope>/[org_<id>/]<name>.<ext>   # UI resource content
//! code/<category>/...                                         # endpoint and form scripts
//! ```
//!
//! A package is either a directory tree or a single zip archive holding the
//! same entries.
//!
//! ## Example
//!
//! ```rust,ignore
//! use compack::io::{ExportService, ImportService, ConverterRegistry};
//!
//! let registry = Arc::new(ConverterRegistry::standard(store.clone(), privileges, tables));
//! let exporter = ExportService::new(registry.clone(), store.clone());
//! let report = exporter.export_package(Path::new("bundle.zip"), &ExportOptions::default())?;
//!
//! let importer = ImportService::new(registry);
//! let report = importer.import_package(Path::new("bundle.zip"), &ImportOptions::default())?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod security;
pub mod storage;

pub use config::CompackConfig;
pub use io::{
    ConverterRegistry, Descriptor, ExportOptions, ExportReport, ExportService, ExportSession,
    ImportOptions, ImportReport, ImportService, PathCodec,
};
pub use models::{AccessScope, Component, ComponentKind};
pub use security::{PrivilegeCatalog, PrivilegeLookup, PrivilegeToken};
pub use storage::{ComponentStore, SqliteComponentStore, TableManager};

/// Error type for compack operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | A descriptor document is malformed or references something missing |
/// | `OperationFailed` | Filesystem, archive, `SQLite` or serialization failure |
/// | `UnrecognizedType` | No converter is registered for a component kind |
/// | `PathDecode` | A path or enum segment does not match a known value |
/// | `ResourceLoad` | A content reference cannot be read |
/// | `UnknownPrivilege` | A privilege name has no matching token |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A metadata document cannot be parsed into its descriptor
    /// - An endpoint's owning resource cannot be resolved
    /// - A generated table name is not a valid identifier
    /// - Two entities encode to the same package path with different content
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Directory or file creation/write fails
    /// - Archive entries cannot be written or read
    /// - `SQLite` operations fail
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// No converter is registered for the requested component kind.
    ///
    /// This is a configuration error and is never retried.
    #[error("unrecognized component type: {0}")]
    UnrecognizedType(String),

    /// A path segment or enum value could not be decoded.
    #[error("cannot decode '{path}': {reason}")]
    PathDecode {
        /// The offending path or value.
        path: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A content reference could not be loaded.
    #[error("cannot load resource '{path}': {cause}")]
    ResourceLoad {
        /// The package-relative content path.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// A privilege name has no matching token.
    #[error("unknown privilege: {0}")]
    UnknownPrivilege(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for compack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
