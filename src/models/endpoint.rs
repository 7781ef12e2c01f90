//! Endpoint entity.

use super::domain::DEFAULT_MODULE;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP method an endpoint answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    #[default]
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the upper-case method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a method name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::PathDecode {
            path: s.to_string(),
            reason: format!("unknown http method '{s}'"),
        })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an endpoint renders its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Render the owning resource as HTML.
    #[default]
    Html,
    /// Serialize the model as JSON.
    ModelAsJson,
    /// Return a file download.
    File,
    /// Stream the response body.
    Stream,
}

impl ResponseKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::ModelAsJson => "model_as_json",
            Self::File => "file",
            Self::Stream => "stream",
        }
    }

    /// Parses a response kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "html" => Some(Self::Html),
            "model_as_json" | "json" => Some(Self::ModelAsJson),
            "file" => Some(Self::File),
            "stream" => Some(Self::Stream),
            _ => None,
        }
    }
}

impl FromStr for ResponseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::PathDecode {
            path: s.to_string(),
            reason: format!("unknown response kind '{s}'"),
        })
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An HTTP-triggered script endpoint owned by a UI resource.
///
/// Natural key: (`resource_id`, `sub_path`, `http_method`, `organization_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Store identity, `None` until first save.
    pub id: Option<i64>,
    /// Identity of the owning UI resource.
    pub resource_id: i64,
    /// Path below the owning resource, e.g. `/submit`.
    pub sub_path: String,
    /// HTTP method.
    pub http_method: HttpMethod,
    /// Response rendering.
    pub response_kind: ResponseKind,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Model attribute names exposed to the response.
    pub model_attributes: Vec<String>,
    /// Script body.
    pub code: String,
    /// Tenant scope; `None` means global.
    pub organization_id: Option<i64>,
    /// Owning application module.
    pub module: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl Endpoint {
    /// Creates an unsaved endpoint for the given owning resource.
    #[must_use]
    pub fn new(resource_id: i64, sub_path: impl Into<String>, http_method: HttpMethod) -> Self {
        Self {
            id: None,
            resource_id,
            sub_path: sub_path.into(),
            http_method,
            response_kind: ResponseKind::default(),
            headers: BTreeMap::new(),
            model_attributes: Vec::new(),
            code: String::new(),
            organization_id: None,
            module: DEFAULT_MODULE.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Sets the script body.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the response kind.
    #[must_use]
    pub const fn with_response_kind(mut self, kind: ResponseKind) -> Self {
        self.response_kind = kind;
        self
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a model attribute name.
    #[must_use]
    pub fn with_model_attribute(mut self, name: impl Into<String>) -> Self {
        self.model_attributes.push(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("post", HttpMethod::Post)]
    #[test_case("GET", HttpMethod::Get)]
    #[test_case("Delete", HttpMethod::Delete)]
    fn test_http_method_parse(input: &str, expected: HttpMethod) {
        assert_eq!(input.parse::<HttpMethod>().ok(), Some(expected));
    }

    #[test]
    fn test_unknown_method_is_path_decode() {
        assert!(matches!(
            "PATCHY".parse::<HttpMethod>(),
            Err(Error::PathDecode { .. })
        ));
    }

    #[test_case("model-as-json", ResponseKind::ModelAsJson)]
    #[test_case("stream", ResponseKind::Stream)]
    fn test_response_kind_parse(input: &str, expected: ResponseKind) {
        assert_eq!(ResponseKind::parse(input), Some(expected));
    }

    #[test]
    fn test_endpoint_builder() {
        let endpoint = Endpoint::new(4, "/submit", HttpMethod::Post)
            .with_header("Cache-Control", "no-store")
            .with_model_attribute("user");
        assert_eq!(endpoint.resource_id, 4);
        assert_eq!(endpoint.headers.len(), 1);
        assert_eq!(endpoint.model_attributes, vec!["user"]);
    }
}
