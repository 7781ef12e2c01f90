//! Privilege name ↔ token resolution.
//!
//! Descriptors reference privileges by name. Entities hold a [`PrivilegeToken`],
//! which can only be obtained through a [`PrivilegeLookup`]; an unknown name
//! fails the import of the entity that references it.
//!
//! # Example
//!
//! ```rust
//! use compack::security::{PrivilegeCatalog, PrivilegeLookup};
//!
//! let catalog = PrivilegeCatalog::builtin();
//! let token = catalog.token("readOrgData").unwrap();
//! assert_eq!(token.as_str(), "readOrgData");
//! assert!(catalog.token("canFly").is_err());
//! ```

use crate::storage::ComponentStore;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Resolved reference to a privilege.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrivilegeToken(String);

impl PrivilegeToken {
    /// Rebuilds a token from a name previously persisted by the store.
    pub(crate) fn from_stored(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the privilege name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrivilegeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Privileges that exist in every installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinPrivilege {
    /// Read backend configuration.
    CanReadBackend,
    /// Modify backend configuration.
    CanManageBackend,
    /// Access global settings.
    CanAccessGlobalSettings,
    /// Read organization data.
    ReadOrgData,
    /// Modify organization data.
    ManageOrgData,
    /// Read user data.
    ReadUserData,
    /// Modify user data.
    ManageUserData,
    /// Import component packages.
    CanImportData,
    /// Export component packages.
    CanExportData,
    /// Read UI resources.
    ReadFrontendResource,
    /// Modify UI resources.
    ManageFrontendResource,
}

impl BuiltinPrivilege {
    /// Returns all built-in privileges.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CanReadBackend,
            Self::CanManageBackend,
            Self::CanAccessGlobalSettings,
            Self::ReadOrgData,
            Self::ManageOrgData,
            Self::ReadUserData,
            Self::ManageUserData,
            Self::CanImportData,
            Self::CanExportData,
            Self::ReadFrontendResource,
            Self::ManageFrontendResource,
        ]
    }

    /// Returns the privilege name as used in descriptors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CanReadBackend => "canReadBackend",
            Self::CanManageBackend => "canManageBackend",
            Self::CanAccessGlobalSettings => "canAccessGlobalSettings",
            Self::ReadOrgData => "readOrgData",
            Self::ManageOrgData => "manageOrgData",
            Self::ReadUserData => "readUserData",
            Self::ManageUserData => "manageUserData",
            Self::CanImportData => "canImportData",
            Self::CanExportData => "canExportData",
            Self::ReadFrontendResource => "readFrontendResource",
            Self::ManageFrontendResource => "manageFrontendResource",
        }
    }
}

/// Resolves privilege names to tokens.
pub trait PrivilegeLookup: Send + Sync {
    /// Returns the token for a privilege name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPrivilege`] if the name is not recognised.
    fn token(&self, name: &str) -> Result<PrivilegeToken>;

    /// Resolves an optional name, treating blank names as absent.
    fn optional_token(&self, name: Option<&str>) -> Result<Option<PrivilegeToken>> {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => self.token(name).map(Some),
            _ => Ok(None),
        }
    }
}

/// Privilege lookup over the built-in set, extra names, and stored privileges.
#[derive(Clone, Default)]
pub struct PrivilegeCatalog {
    names: BTreeSet<String>,
    store: Option<Arc<dyn ComponentStore>>,
}

impl PrivilegeCatalog {
    /// Creates a catalog containing only the built-in privileges.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            names: BuiltinPrivilege::all()
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            store: None,
        }
    }

    /// Creates a catalog that also consults privileges persisted in the store.
    ///
    /// Privileges imported earlier in the same package become resolvable.
    #[must_use]
    pub fn with_store(store: Arc<dyn ComponentStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::builtin()
        }
    }

    /// Adds an extra privilege name.
    #[must_use]
    pub fn with_privilege(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }
}

impl fmt::Debug for PrivilegeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivilegeCatalog")
            .field("names", &self.names)
            .field("store", &self.store.is_some())
            .finish()
    }
}

impl PrivilegeLookup for PrivilegeCatalog {
    fn token(&self, name: &str) -> Result<PrivilegeToken> {
        if self.names.contains(name) {
            return Ok(PrivilegeToken(name.to_string()));
        }
        if let Some(store) = &self.store
            && store.find_privilege(name)?.is_some()
        {
            return Ok(PrivilegeToken(name.to_string()));
        }
        Err(Error::UnknownPrivilege(name.to_string()))
    }
}
