//! UI resource converter.
//!
//! Exporting a resource cascades into its endpoints: each owned endpoint is
//! written through the endpoint converter into the same session, and its
//! descriptor is embedded in the resource document. Importing the document
//! recreates the resource first, then every embedded endpoint under the
//! resource's identity.

use super::{EndpointConverter, content_codec, decode_metadata_path};
use crate::io::converter::{ComponentConverter, load_content, write_component};
use crate::io::descriptors::{ComponentDescriptor, EndpointDescriptor, UiResourceDescriptor};
use crate::io::path_codec::{METADATA_EXTENSION, PathCodec, sanitize_name};
use crate::io::resources::ResourceLoader;
use crate::io::session::ExportSession;
use crate::models::{ComponentKind, Endpoint, UiResource};
use crate::security::PrivilegeLookup;
use crate::storage::ComponentStore;
use crate::{Error, Result};
use std::sync::Arc;

/// Converts UI resources (and, by cascade, their endpoints).
pub struct UiResourceConverter {
    store: Arc<dyn ComponentStore>,
    privileges: Arc<dyn PrivilegeLookup>,
    endpoints: Arc<EndpointConverter>,
}

impl UiResourceConverter {
    /// Creates the converter, delegating endpoints to `endpoints`.
    #[must_use]
    pub fn new(
        store: Arc<dyn ComponentStore>,
        privileges: Arc<dyn PrivilegeLookup>,
        endpoints: Arc<EndpointConverter>,
    ) -> Self {
        Self {
            store,
            privileges,
            endpoints,
        }
    }

    /// Descriptor without children.
    fn own_descriptor(&self, entity: &UiResource) -> Result<UiResourceDescriptor> {
        let content_ref = if entity.content.is_empty() {
            None
        } else {
            self.content_path(entity)?
        };

        Ok(UiResourceDescriptor {
            base: ComponentDescriptor::new(&entity.module, entity.organization_id),
            name: entity.name.clone(),
            access_scope: Some(entity.access_scope),
            required_privilege: entity
                .required_privilege
                .as_ref()
                .map(|token| token.as_str().to_string()),
            resource_kind: entity.resource_kind,
            category: entity.category,
            content_ref,
            embeddable: entity.embeddable,
            include_in_sitemap: entity.include_in_sitemap,
            endpoints: Vec::new(),
        })
    }

    fn owned_endpoints(&self, entity: &UiResource) -> Result<Vec<Endpoint>> {
        match entity.id {
            Some(id) => self.store.endpoints_for_resource(id),
            None => Ok(Vec::new()),
        }
    }
}

impl ComponentConverter for UiResourceConverter {
    type Entity = UiResource;
    type Descriptor = UiResourceDescriptor;

    fn content_path(&self, entity: &UiResource) -> Result<Option<String>> {
        Ok(Some(content_codec(ComponentKind::Resource)?.encode(
            Some(entity.access_scope),
            entity.organization_id,
            &sanitize_name(&entity.name),
            entity.resource_kind.extension(),
        )))
    }

    fn content<'a>(&self, entity: &'a UiResource) -> &'a str {
        &entity.content
    }

    fn metadata_path(&self, entity: &UiResource) -> Result<String> {
        Ok(PathCodec::metadata(ComponentKind::Resource).encode(
            Some(entity.access_scope),
            entity.organization_id,
            &sanitize_name(&entity.name),
            METADATA_EXTENSION,
        ))
    }

    fn to_descriptor(&self, entity: &UiResource) -> Result<UiResourceDescriptor> {
        let mut descriptor = self.own_descriptor(entity)?;
        descriptor.endpoints = self
            .owned_endpoints(entity)?
            .iter()
            .map(|endpoint| self.endpoints.to_descriptor(endpoint))
            .collect::<Result<Vec<EndpointDescriptor>>>()?;
        Ok(descriptor)
    }

    fn export(
        &self,
        entity: &UiResource,
        session: &mut ExportSession,
    ) -> Result<UiResourceDescriptor> {
        let mut children = Vec::new();
        for endpoint in self.owned_endpoints(entity)? {
            children.push(self.endpoints.export(&endpoint, session)?);
        }

        let mut descriptor = self.own_descriptor(entity)?;
        descriptor.endpoints = children;
        write_component(self, entity, &descriptor, session)?;
        Ok(descriptor)
    }

    fn from_descriptor(
        &self,
        descriptor: UiResourceDescriptor,
        path: &str,
        resources: &dyn ResourceLoader,
    ) -> Result<UiResource> {
        let decoded = decode_metadata_path(ComponentKind::Resource, path)?;
        let access_scope = descriptor
            .access_scope
            .or(decoded.access_scope)
            .ok_or_else(|| {
                Error::InvalidInput(format!("resource '{}' has no access scope", descriptor.name))
            })?;
        let organization_id = descriptor.base.organization_id.or(decoded.organization_id);
        let required_privilege = self
            .privileges
            .optional_token(descriptor.required_privilege.as_deref())?;
        let content = load_content(descriptor.content_ref.as_deref(), resources)?;

        let mut resource = match self.store.find_resource(
            &descriptor.name,
            access_scope,
            organization_id,
        )? {
            Some(existing) => existing,
            None => {
                let mut created = UiResource::new(&descriptor.name, access_scope);
                created.organization_id = organization_id;
                created
            },
        };

        resource.required_privilege = required_privilege;
        resource.resource_kind = descriptor.resource_kind;
        resource.category = descriptor.category;
        resource.content = content;
        resource.embeddable = descriptor.embeddable;
        resource.include_in_sitemap = descriptor.include_in_sitemap;
        resource.module = descriptor.base.module;

        let saved = self.store.save_resource(&resource)?;
        tracing::debug!(
            name = %saved.name,
            access_scope = %saved.access_scope,
            organization_id = ?saved.organization_id,
            endpoints = descriptor.endpoints.len(),
            "Imported UI resource"
        );

        for mut child in descriptor.endpoints {
            child.resource_id = saved.id;
            self.endpoints.from_descriptor(child, path, resources)?;
        }
        Ok(saved)
    }
}
