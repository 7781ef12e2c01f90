//! The `Component` sum type over every exportable entity.

use super::domain::ComponentKind;
use super::endpoint::Endpoint;
use super::form::Form;
use super::listener::{EventListener, Scheduler};
use super::privilege::Privilege;
use super::resource::UiResource;

/// Any exportable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    /// UI resource.
    Resource(UiResource),
    /// Endpoint.
    Endpoint(Endpoint),
    /// Form.
    Form(Form),
    /// Event listener.
    Listener(EventListener),
    /// Scheduler.
    Scheduler(Scheduler),
    /// Privilege.
    Privilege(Privilege),
}

impl Component {
    /// Returns the kind of the wrapped entity.
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

    /// Returns the store identity, if the entity has been saved.
    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        match self {
            Self::Resource(e) => e.id,
            Self::Endpoint(e) => e.id,
            Self::Form(e) => e.id,
            Self::Listener(e) => e.id,
            Self::Scheduler(e) => e.id,
            Self::Privilege(e) => e.id,
        }
    }

    /// Returns the owning organization. Privileges are always global.
    #[must_use]
    pub const fn organization_id(&self) -> Option<i64> {
        match self {
            Self::Resource(e) => e.organization_id,
            Self::Endpoint(e) => e.organization_id,
            Self::Form(e) => e.organization_id,
            Self::Listener(e) => e.organization_id,
            Self::Scheduler(e) => e.organization_id,
            Self::Privilege(_) => None,
        }
    }

    /// Returns a human-readable rendering of the natural key, used in reports.
    #[must_use]
    pub fn natural_key(&self) -> String {
        match self {
            Self::Resource(e) => e.natural_key(),
            Self::Endpoint(e) => e.natural_key(),
            Self::Form(e) => e.natural_key(),
            Self::Listener(e) => e.natural_key(),
            Self::Scheduler(e) => e.natural_key(),
            Self::Privilege(e) => e.natural_key(),
        }
    }
}

fn org_suffix(organization_id: Option<i64>) -> String {
    organization_id.map_or_else(String::new, |id| format!("/org_{id}"))
}

/// Typed access to one variant of [`Component`].
pub trait ComponentEntity: Sized {
    /// The kind this entity type represents.
    const KIND: ComponentKind;

    /// Borrows the entity out of a component, if the variant matches.
    fn from_component(component: &Component) -> Option<&Self>;

    /// Wraps the entity into a component.
    fn into_component(self) -> Component;

    /// Human-readable natural key.
    fn natural_key(&self) -> String;
}

macro_rules! component_entity {
    ($ty:ty, $variant:ident, |$e:ident| $key:expr) => {
        impl ComponentEntity for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn natural_key(&self) -> String {
                let $e = self;
                $key
            }

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(entity) => Some(entity),
                    _ => None,
                }
            }

            fn into_component(self) -> Component {
                Component::$variant(self)
            }
        }

        impl From<$ty> for Component {
            fn from(entity: $ty) -> Self {
                Component::$variant(entity)
            }
        }
    };
}

component_entity!(UiResource, Resource, |r| format!(
    "{}@{}{}",
    r.name,
    r.access_scope,
    org_suffix(r.organization_id)
));
component_entity!(Endpoint, Endpoint, |e| format!(
    "resource#{} {} {}{}",
    e.resource_id,
    e.http_method,
    e.sub_path,
    org_suffix(e.organization_id)
));
component_entity!(Form, Form, |f| f.name.clone());
component_entity!(EventListener, Listener, |l| format!(
    "{}{}",
    l.event_name,
    org_suffix(l.organization_id)
));
component_entity!(Scheduler, Scheduler, |s| format!(
    "{}{}",
    s.event_data,
    org_suffix(s.organization_id)
));
component_entity!(Privilege, Privilege, |p| p.name.clone());

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessScope, HttpMethod};

    #[test]
    fn test_natural_key_rendering() {
        let resource = Component::from(
            UiResource::new("home", AccessScope::Public).with_organization(3),
        );
        assert_eq!(resource.natural_key(), "home@public/org_3");
        assert_eq!(resource.kind(), ComponentKind::Resource);

        let endpoint = Component::from(Endpoint::new(9, "/submit", HttpMethod::Post));
        assert_eq!(endpoint.natural_key(), "resource#9 POST /submit");
    }

    #[test]
    fn test_from_component_variant_mismatch() {
        let component = Component::from(Privilege::new("canExport", "admin", "system"));
        assert!(Privilege::from_component(&component).is_some());
        assert!(Form::from_component(&component).is_none());
    }
}
