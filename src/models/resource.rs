//! UI resource entity.

use super::domain::{AccessScope, DEFAULT_MODULE};
use crate::Error;
use crate::security::PrivilegeToken;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Markup/content type of a UI resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// HTML markup.
    #[default]
    Html,
    /// Stylesheet.
    Css,
    /// Client-side script.
    Js,
    /// JSON document.
    Json,
    /// Plain text.
    Text,
}

impl ResourceKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    /// Returns the file extension used for content of this kind.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    /// Parses a resource kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(Self::Html),
            "css" => Some(Self::Css),
            "js" | "javascript" => Some(Self::Js),
            "json" => Some(Self::Json),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::PathDecode {
            path: s.to_string(),
            reason: format!("unknown resource kind '{s}'"),
        })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a resource is a standalone page or a component bound to endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    /// Standalone page.
    #[default]
    Page,
    /// UI component served through its endpoints.
    Component,
}

impl ResourceCategory {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Component => "component",
        }
    }

    /// Parses a category.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "page" | "resource" => Some(Self::Page),
            "component" | "ui_component" | "ui-component" => Some(Self::Component),
            _ => None,
        }
    }
}

impl FromStr for ResourceCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::PathDecode {
            path: s.to_string(),
            reason: format!("unknown resource category '{s}'"),
        })
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A UI resource as stored in the component store.
///
/// Natural key: (`name`, `access_scope`, `organization_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiResource {
    /// Store identity, `None` until first save.
    pub id: Option<i64>,
    /// Resource name (URL-facing).
    pub name: String,
    /// Visibility tier.
    pub access_scope: AccessScope,
    /// Tenant scope; `None` means global.
    pub organization_id: Option<i64>,
    /// Privilege required to view the resource.
    pub required_privilege: Option<PrivilegeToken>,
    /// Content type.
    pub resource_kind: ResourceKind,
    /// Page or API-bound component.
    pub category: ResourceCategory,
    /// Raw markup/script body.
    pub content: String,
    /// Whether the resource may be embedded in other pages.
    pub embeddable: bool,
    /// Whether the resource is listed in the sitemap.
    pub include_in_sitemap: bool,
    /// Owning application module.
    pub module: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl UiResource {
    /// Creates an unsaved resource with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, access_scope: AccessScope) -> Self {
        Self {
            id: None,
            name: name.into(),
            access_scope,
            organization_id: None,
            required_privilege: None,
            resource_kind: ResourceKind::default(),
            category: ResourceCategory::default(),
            content: String::new(),
            embeddable: false,
            include_in_sitemap: false,
            module: DEFAULT_MODULE.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Sets the organization scope.
    #[must_use]
    pub const fn with_organization(mut self, organization_id: i64) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Sets the content body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the resource kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.resource_kind = kind;
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: ResourceCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets the required privilege.
    #[must_use]
    pub fn with_required_privilege(mut self, privilege: PrivilegeToken) -> Self {
        self.required_privilege = Some(privilege);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ResourceKind::Html, "html")]
    #[test_case(ResourceKind::Js, "js")]
    #[test_case(ResourceKind::Text, "txt")]
    fn test_resource_kind_extension(kind: ResourceKind, ext: &str) {
        assert_eq!(kind.extension(), ext);
    }

    #[test]
    fn test_resource_category_parse() {
        assert_eq!(ResourceCategory::parse("page"), Some(ResourceCategory::Page));
        assert_eq!(
            ResourceCategory::parse("UI_COMPONENT"),
            Some(ResourceCategory::Component)
        );
        assert!("dashboard".parse::<ResourceCategory>().is_err());
    }

    #[test]
    fn test_resource_builder() {
        let resource = UiResource::new("home", AccessScope::Public)
            .with_organization(7)
            .with_content("<h1>Hi</h1>");
        assert_eq!(resource.organization_id, Some(7));
        assert_eq!(resource.module, DEFAULT_MODULE);
        assert!(resource.id.is_none());
    }
}
