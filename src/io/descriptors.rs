//! Metadata documents written into packages.
//!
//! A descriptor is the flat, primary-key-free form of one entity. Field names
//! are camelCase in the serialized YAML. Parent kinds embed their children
//! (a UI resource carries its endpoints) so one document is enough to rebuild
//! the whole subtree.

use crate::models::{
    AccessScope, ComponentKind, DEFAULT_MODULE, HttpMethod, ResourceCategory, ResourceKind,
    ResponseKind,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

const fn default_true() -> bool {
    true
}

/// Fields shared by every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    /// Owning module.
    #[serde(default = "default_module")]
    pub module: String,
    /// Tenant scope; absent means global.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
}

impl ComponentDescriptor {
    /// Creates the base fields.
    #[must_use]
    pub fn new(module: impl Into<String>, organization_id: Option<i64>) -> Self {
        Self {
            module: module.into(),
            organization_id,
        }
    }
}

impl Default for ComponentDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE, None)
    }
}

/// UI resource document, with its endpoints embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiResourceDescriptor {
    /// Base fields.
    #[serde(flatten)]
    pub base: ComponentDescriptor,
    /// Resource name.
    pub name: String,
    /// Visibility tier; taken from the path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_scope: Option<AccessScope>,
    /// Privilege needed to view the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_privilege: Option<String>,
    /// Content type.
    #[serde(default)]
    pub resource_kind: ResourceKind,
    /// Page or API-bound component.
    #[serde(default)]
    pub category: ResourceCategory,
    /// Package-relative path of the content file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_ref: Option<String>,
    /// Whether the resource may be embedded in other pages.
    #[serde(default)]
    pub embeddable: bool,
    /// Whether the resource is listed in the sitemap.
    #[serde(default)]
    pub include_in_sitemap: bool,
    /// Endpoints owned by this resource.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<EndpointDescriptor>,
}

/// Endpoint document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// Base fields.
    #[serde(flatten)]
    pub base: ComponentDescriptor,
    /// Name of the owning resource.
    pub resource_name: String,
    /// Owning resource identity, assigned by the parent during an import
    /// cascade. Never serialized.
    #[serde(skip)]
    pub resource_id: Option<i64>,
    /// Path below the owning resource.
    pub sub_path: String,
    /// HTTP method.
    pub http_method: HttpMethod,
    /// How the response is rendered.
    #[serde(default)]
    pub response_kind: ResponseKind,
    /// Response headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Model attributes exposed to the script.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_attributes: Vec<String>,
    /// Package-relative path of the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_ref: Option<String>,
}

/// Form document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDescriptor {
    /// Base fields.
    #[serde(flatten)]
    pub base: ComponentDescriptor,
    /// Form name (natural key).
    pub name: String,
    /// Privilege needed to read rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_privilege: Option<String>,
    /// Privilege needed to write rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_privilege: Option<String>,
    /// Generated table name.
    pub table_name: String,
    /// Columns shown in table views.
    #[serde(default)]
    pub table_columns: Vec<String>,
    /// Columns offered as filters.
    #[serde(default)]
    pub filter_columns: Vec<String>,
    /// Shown on the dashboard.
    #[serde(default)]
    pub show_on_dashboard: bool,
    /// Registers an API controller.
    #[serde(default)]
    pub register_api_controller: bool,
    /// Registers an HTML controller.
    #[serde(default)]
    pub register_html_controller: bool,
    /// Package-relative path of the form script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_ref: Option<String>,
}

/// Event listener document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerDescriptor {
    /// Base fields.
    #[serde(flatten)]
    pub base: ComponentDescriptor,
    /// Event name.
    pub event_name: String,
    /// Consumer class.
    pub consumer_class: String,
    /// Consumer method.
    pub consumer_method: String,
    /// Consumer parameter class.
    #[serde(default)]
    pub consumer_parameter_class: String,
    /// Generic slot 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data_1: Option<String>,
    /// Generic slot 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data_2: Option<String>,
    /// Generic slot 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data_3: Option<String>,
    /// Generic slot 4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data_4: Option<String>,
}

/// Scheduler document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerDescriptor {
    /// Base fields.
    #[serde(flatten)]
    pub base: ComponentDescriptor,
    /// Event payload emitted on each tick.
    pub event_data: String,
    /// Cron expression.
    pub cron_expression: String,
    /// Run on the master node only.
    #[serde(default = "default_true")]
    pub on_master_only: bool,
}

/// Privilege document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeDescriptor {
    /// Base fields.
    #[serde(flatten)]
    pub base: ComponentDescriptor,
    /// Privilege name.
    pub name: String,
    /// Category.
    #[serde(default)]
    pub category: String,
    /// Group.
    #[serde(default)]
    pub group: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
}

/// Any descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Descriptor {
    /// UI resource.
    Resource(UiResourceDescriptor),
    /// Endpoint.
    Endpoint(EndpointDescriptor),
    /// Form.
    Form(FormDescriptor),
    /// Event listener.
    Listener(EventListenerDescriptor),
    /// Scheduler.
    Scheduler(SchedulerDescriptor),
    /// Privilege.
    Privilege(PrivilegeDescriptor),
}

impl Descriptor {
    /// Returns the kind this descriptor describes.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Resource(_) => ComponentKind::Resource,
            Self::Endpoint(_) => ComponentKind::Endpoint,
            Self::Form(_) => ComponentKind::Form,
            Self::Listener(_) => ComponentKind::Listener,
            Self::Scheduler(_) => ComponentKind::Scheduler,
            Self::Privilege(_) => ComponentKind::Privilege,
        }
    }

    /// Returns the shared base fields.
    #[must_use]
    pub const fn base(&self) -> &ComponentDescriptor {
        match self {
            Self::Resource(d) => &d.base,
            Self::Endpoint(d) => &d.base,
            Self::Form(d) => &d.base,
            Self::Listener(d) => &d.base,
            Self::Scheduler(d) => &d.base,
            Self::Privilege(d) => &d.base,
        }
    }

    /// Serializes the descriptor to a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::operation("serialize_descriptor", e))
    }

    /// Parses a YAML document as a descriptor of the given kind.
    ///
    /// The kind is not stored in the document; it comes from the category
    /// segment of the document's path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document does not match the kind.
    pub fn from_yaml(kind: ComponentKind, yaml: &str) -> Result<Self> {
        fn parse<T: serde::de::DeserializeOwned>(kind: ComponentKind, yaml: &str) -> Result<T> {
            serde_yaml_ng::from_str(yaml)
                .map_err(|e| Error::InvalidInput(format!("malformed {kind} descriptor: {e}")))
        }

        Ok(match kind {
            ComponentKind::Resource => Self::Resource(parse(kind, yaml)?),
            ComponentKind::Endpoint => Self::Endpoint(parse(kind, yaml)?),
            ComponentKind::Form => Self::Form(parse(kind, yaml)?),
            ComponentKind::Listener => Self::Listener(parse(kind, yaml)?),
            ComponentKind::Scheduler => Self::Scheduler(parse(kind, yaml)?),
            ComponentKind::Privilege => Self::Privilege(parse(kind, yaml)?),
        })
    }
}

/// A concrete descriptor type, convertible to and from [`Descriptor`].
pub trait DescriptorType: Serialize + Sized {
    /// Kind described by this type.
    const KIND: ComponentKind;

    /// Extracts this type from the sum type.
    fn from_descriptor(descriptor: Descriptor) -> Option<Self>;

    /// Wraps this value in the sum type.
    fn into_descriptor(self) -> Descriptor;
}

macro_rules! descriptor_type {
    ($ty:ty, $variant:ident) => {
        impl DescriptorType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_descriptor(descriptor: Descriptor) -> Option<Self> {
                match descriptor {
                    Descriptor::$variant(d) => Some(d),
                    _ => None,
                }
            }

            fn into_descriptor(self) -> Descriptor {
                Descriptor::$variant(self)
            }
        }

        impl From<$ty> for Descriptor {
            fn from(descriptor: $ty) -> Self {
                Self::$variant(descriptor)
            }
        }
    };
}

descriptor_type!(UiResourceDescriptor, Resource);
descriptor_type!(EndpointDescriptor, Endpoint);
descriptor_type!(FormDescriptor, Form);
descriptor_type!(EventListenerDescriptor, Listener);
descriptor_type!(SchedulerDescriptor, Scheduler);
descriptor_type!(PrivilegeDescriptor, Privilege);
