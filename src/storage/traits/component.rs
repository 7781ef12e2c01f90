//! Component store trait.

use crate::Result;
use crate::models::{
    AccessScope, Component, ComponentKind, Endpoint, EventListener, Form, HttpMethod, Privilege,
    Scheduler, UiResource,
};

/// Relational storage for exportable components.
///
/// Converters only ever look rows up by natural key and save them; query and
/// transaction mechanics stay behind this trait.
///
/// `save_*` assigns an identity on first save (when the entity's `id` is
/// `None`), always refreshes `updated_at`, and returns the persisted entity.
pub trait ComponentStore: Send + Sync {
    /// Finds a UI resource by (name, access scope, organization).
    fn find_resource(
        &self,
        name: &str,
        access_scope: AccessScope,
        organization_id: Option<i64>,
    ) -> Result<Option<UiResource>>;

    /// Finds a UI resource by identity.
    fn find_resource_by_id(&self, id: i64) -> Result<Option<UiResource>>;

    /// Saves a UI resource.
    fn save_resource(&self, resource: &UiResource) -> Result<UiResource>;

    /// Lists all UI resources.
    fn list_resources(&self) -> Result<Vec<UiResource>>;

    /// Finds an endpoint by (owning resource, sub-path, method, organization).
    fn find_endpoint(
        &self,
        resource_id: i64,
        sub_path: &str,
        http_method: HttpMethod,
        organization_id: Option<i64>,
    ) -> Result<Option<Endpoint>>;

    /// Lists the endpoints owned by a resource, ordered by identity.
    fn endpoints_for_resource(&self, resource_id: i64) -> Result<Vec<Endpoint>>;

    /// Saves an endpoint.
    fn save_endpoint(&self, endpoint: &Endpoint) -> Result<Endpoint>;

    /// Lists all endpoints.
    fn list_endpoints(&self) -> Result<Vec<Endpoint>>;

    /// Finds a form by name.
    fn find_form(&self, name: &str) -> Result<Option<Form>>;

    /// Saves a form.
    fn save_form(&self, form: &Form) -> Result<Form>;

    /// Lists all forms.
    fn list_forms(&self) -> Result<Vec<Form>>;

    /// Finds an event listener by (event name, organization).
    fn find_listener(
        &self,
        event_name: &str,
        organization_id: Option<i64>,
    ) -> Result<Option<EventListener>>;

    /// Saves an event listener.
    fn save_listener(&self, listener: &EventListener) -> Result<EventListener>;

    /// Lists all event listeners.
    fn list_listeners(&self) -> Result<Vec<EventListener>>;

    /// Finds a scheduler by (event data, organization).
    fn find_scheduler(
        &self,
        event_data: &str,
        organization_id: Option<i64>,
    ) -> Result<Option<Scheduler>>;

    /// Saves a scheduler.
    fn save_scheduler(&self, scheduler: &Scheduler) -> Result<Scheduler>;

    /// Lists all schedulers.
    fn list_schedulers(&self) -> Result<Vec<Scheduler>>;

    /// Finds a privilege by name.
    fn find_privilege(&self, name: &str) -> Result<Option<Privilege>>;

    /// Saves a privilege.
    fn save_privilege(&self, privilege: &Privilege) -> Result<Privilege>;

    /// Lists all privileges.
    fn list_privileges(&self) -> Result<Vec<Privilege>>;

    /// Lists every stored component of one kind.
    fn list(&self, kind: ComponentKind) -> Result<Vec<Component>> {
        Ok(match kind {
            ComponentKind::Resource => wrap(self.list_resources()?),
            ComponentKind::Endpoint => wrap(self.list_endpoints()?),
            ComponentKind::Form => wrap(self.list_forms()?),
            ComponentKind::Listener => wrap(self.list_listeners()?),
            ComponentKind::Scheduler => wrap(self.list_schedulers()?),
            ComponentKind::Privilege => wrap(self.list_privileges()?),
        })
    }
}

fn wrap<T: Into<Component>>(entities: Vec<T>) -> Vec<Component> {
    entities.into_iter().map(Into::into).collect()
}
