//! Package manifest.

use crate::models::ComponentKind;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package-relative path of the manifest.
pub const MANIFEST_PATH: &str = "manifest.yaml";

/// Highest package format version this build reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

/// Summary written at the root of every batch-exported package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package format version.
    pub format_version: u32,
    /// When the package was written.
    pub created_at: DateTime<Utc>,
    /// Number of exported entities per kind.
    #[serde(default)]
    pub components: BTreeMap<ComponentKind, usize>,
}

impl PackageManifest {
    /// Creates a manifest for the current format, stamped now.
    #[must_use]
    pub fn new(components: BTreeMap<ComponentKind, usize>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            components,
        }
    }

    /// Serializes the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::operation("serialize_manifest", e))
    }

    /// Parses a manifest and checks that its format version is supported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document is malformed or was
    /// written by a newer format version.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::InvalidInput(format!("malformed package manifest: {e}")))?;
        if manifest.format_version > FORMAT_VERSION {
            return Err(Error::InvalidInput(format!(
                "package format version {} is newer than supported version {FORMAT_VERSION}",
                manifest.format_version
            )));
        }
        Ok(manifest)
    }
}
