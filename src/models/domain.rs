//! Component kinds and access scopes.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module name assigned to components that do not declare one.
pub const DEFAULT_MODULE: &str = "core";

/// Exportable component categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Access-control privilege.
    Privilege,
    /// Dynamic form/table definition.
    Form,
    /// UI resource (page or API-bound component).
    Resource,
    /// HTTP-triggered script endpoint owned by a UI resource.
    Endpoint,
    /// Event listener registration.
    Listener,
    /// Cron-driven scheduler.
    Scheduler,
}

impl ComponentKind {
    /// Returns all kinds in import order.
    ///
    /// Privileges come first so forms and resources can resolve them; resources
    /// precede endpoints so standalone endpoint documents find their owner.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Privilege,
            Self::Form,
            Self::Resource,
            Self::Endpoint,
            Self::Listener,
            Self::Scheduler,
        ]
    }

    /// Returns the category path segment for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Privilege => "privilege",
            Self::Form => "form",
            Self::Resource => "resource",
            Self::Endpoint => "endpoint",
            Self::Listener => "listener",
            Self::Scheduler => "scheduler",
        }
    }

    /// Parses a kind from its category segment.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "privilege" | "privileges" => Some(Self::Privilege),
            "form" | "forms" => Some(Self::Form),
            "resource" | "resources" => Some(Self::Resource),
            "endpoint" | "endpoints" => Some(Self::Endpoint),
            "listener" | "listeners" => Some(Self::Listener),
            "scheduler" | "schedulers" => Some(Self::Scheduler),
            _ => None,
        }
    }

    /// Returns true if package paths for this kind carry an access-scope segment.
    #[must_use]
    pub const fn is_access_scoped(&self) -> bool {
        matches!(self, Self::Resource | Self::Endpoint)
    }

    /// Returns the top-level package directory holding this kind's content, if any.
    #[must_use]
    pub const fn content_root(&self) -> Option<&'static str> {
        match self {
            Self::Resource => Some("resources"),
            Self::Endpoint | Self::Form => Some("code"),
            Self::Privilege | Self::Listener | Self::Scheduler => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidInput(format!("unknown component kind '{s}'")))
    }
}

/// Visibility tier of a UI resource, embedded in its package path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    /// Reachable without authentication.
    #[default]
    Public,
    /// Reachable by any authenticated user regardless of organization.
    Global,
    /// Reachable within an organization context.
    Organization,
    /// Used internally by other components only.
    Internal,
}

impl AccessScope {
    /// Returns all access scopes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Public, Self::Global, Self::Organization, Self::Internal]
    }

    /// Returns the path segment for this scope.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Global => "global",
            Self::Organization => "organization",
            Self::Internal => "internal",
        }
    }

    /// Parses a scope from its path segment.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Self::Public),
            "global" => Some(Self::Global),
            "organization" | "org" => Some(Self::Organization),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for AccessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::PathDecode {
            path: s.to_string(),
            reason: format!("unknown access scope '{s}'"),
        })
    }
}
