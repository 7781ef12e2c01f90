//! Endpoint converter.
//!
//! Endpoint paths are derived from the owning resource:
//!
//! ```text
//! config/endpoint/<access>/[org_<id>/]<resource>-<METHOD>-<sub/path>.yaml
//! code/endpoint/<access>/[org_<id>/]<resource>-<METHOD>-<sub/path>.js
//! ```

use super::content_codec;
use crate::io::converter::{ComponentConverter, load_content};
use crate::io::descriptors::{ComponentDescriptor, EndpointDescriptor};
use crate::io::path_codec::{METADATA_EXTENSION, PathCodec, sanitize_name, sanitize_sub_path};
use crate::io::resources::ResourceLoader;
use crate::models::{ComponentKind, Endpoint, HttpMethod, UiResource};
use crate::storage::ComponentStore;
use crate::{Error, Result};
use std::sync::Arc;

const CODE_EXTENSION: &str = "js";

/// Converts endpoints to and from their descriptors.
pub struct EndpointConverter {
    store: Arc<dyn ComponentStore>,
}

impl EndpointConverter {
    /// Creates the converter.
    #[must_use]
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }

    fn owner(&self, endpoint: &Endpoint) -> Result<UiResource> {
        self.store
            .find_resource_by_id(endpoint.resource_id)?
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "endpoint {} {} references missing resource #{}",
                    endpoint.http_method, endpoint.sub_path, endpoint.resource_id
                ))
            })
    }

    fn path(&self, endpoint: &Endpoint, codec: PathCodec, extension: &str) -> Result<String> {
        let owner = self.owner(endpoint)?;
        Ok(codec.encode(
            Some(owner.access_scope),
            owner.organization_id,
            &file_stem(&owner.name, endpoint.http_method, &endpoint.sub_path),
            extension,
        ))
    }

    /// Resolves the owning resource when no cascade assigned it: by name, plus
    /// the access scope and organization decoded from the document path.
    ///
    /// The path segments describe the owner, not the endpoint.
    fn resolve_owner(&self, descriptor: &EndpointDescriptor, path: &str) -> Result<i64> {
        let decoded = PathCodec::metadata(ComponentKind::Endpoint).decode(path)?;
        let access_scope = decoded.access_scope.unwrap_or_default();

        self.store
            .find_resource(&descriptor.resource_name, access_scope, decoded.organization_id)?
            .and_then(|r| r.id)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "owning resource '{}' ({access_scope}{}) not found for endpoint {} {}",
                    descriptor.resource_name,
                    decoded
                        .organization_id
                        .map_or_else(String::new, |id| format!(", org {id}")),
                    descriptor.http_method,
                    descriptor.sub_path
                ))
            })
    }
}

/// `<resource>-<METHOD>-<sub/path>`, with each segment sanitized.
fn file_stem(resource_name: &str, method: HttpMethod, sub_path: &str) -> String {
    format!(
        "{}-{}-{}",
        sanitize_name(resource_name),
        method.as_str(),
        sanitize_sub_path(sub_path)
    )
}

impl ComponentConverter for EndpointConverter {
    type Entity = Endpoint;
    type Descriptor = EndpointDescriptor;

    fn content_path(&self, entity: &Endpoint) -> Result<Option<String>> {
        self.path(entity, content_codec(ComponentKind::Endpoint)?, CODE_EXTENSION)
            .map(Some)
    }

    fn content<'a>(&self, entity: &'a Endpoint) -> &'a str {
        &entity.code
    }

    fn metadata_path(&self, entity: &Endpoint) -> Result<String> {
        self.path(
            entity,
            PathCodec::metadata(ComponentKind::Endpoint),
            METADATA_EXTENSION,
        )
    }

    fn to_descriptor(&self, entity: &Endpoint) -> Result<EndpointDescriptor> {
        let owner = self.owner(entity)?;
        let code_ref = if entity.code.is_empty() {
            None
        } else {
            self.content_path(entity)?
        };

        Ok(EndpointDescriptor {
            base: ComponentDescriptor::new(&entity.module, entity.organization_id),
            resource_name: owner.name,
            resource_id: None,
            sub_path: entity.sub_path.clone(),
            http_method: entity.http_method,
            response_kind: entity.response_kind,
            headers: entity.headers.clone(),
            model_attributes: entity.model_attributes.clone(),
            code_ref,
        })
    }

    fn from_descriptor(
        &self,
        descriptor: EndpointDescriptor,
        path: &str,
        resources: &dyn ResourceLoader,
    ) -> Result<Endpoint> {
        // Only the descriptor carries the endpoint's own organization.
        let organization_id = descriptor.base.organization_id;
        let resource_id = match descriptor.resource_id {
            Some(id) => id,
            None => self.resolve_owner(&descriptor, path)?,
        };
        let code = load_content(descriptor.code_ref.as_deref(), resources)?;

        let mut endpoint = match self.store.find_endpoint(
            resource_id,
            &descriptor.sub_path,
            descriptor.http_method,
            organization_id,
        )? {
            Some(existing) => existing,
            None => {
                let mut created =
                    Endpoint::new(resource_id, &descriptor.sub_path, descriptor.http_method);
                created.organization_id = organization_id;
                created
            },
        };

        endpoint.response_kind = descriptor.response_kind;
        endpoint.headers = descriptor.headers;
        endpoint.model_attributes = descriptor.model_attributes;
        endpoint.module = descriptor.base.module;
        endpoint.code = code;

        let saved = self.store.save_endpoint(&endpoint)?;
        tracing::debug!(
            resource_id,
            method = %saved.http_method,
            sub_path = %saved.sub_path,
            "Imported endpoint"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::resources::MapResourceLoader;
    use crate::models::{AccessScope, ResponseKind};
    use crate::storage::SqliteComponentStore;

    fn setup() -> (Arc<SqliteComponentStore>, EndpointConverter, i64) {
        let store = Arc::new(SqliteComponentStore::in_memory().unwrap());
        let resource = store
            .save_resource(&UiResource::new("home", AccessScope::Public))
            .unwrap();
        let converter = EndpointConverter::new(store.clone());
        (store, converter, resource.id.unwrap())
    }

    #[test]
    fn test_paths_follow_owner_scope() {
        let (_store, converter, resource_id) = setup();
        let endpoint = Endpoint::new(resource_id, "/submit", HttpMethod::Post).with_code("ok();");

        assert_eq!(
            converter.metadata_path(&endpoint).unwrap(),
            "config/endpoint/public/home-POST-/submit.yaml"
        );
        assert_eq!(
            converter.content_path(&endpoint).unwrap().as_deref(),
            Some("code/endpoint/public/home-POST-/submit.js")
        );
    }

    #[test]
    fn test_missing_owner_is_invalid_input() {
        let (_store, converter, _) = setup();
        let orphan = Endpoint::new(999, "/x", HttpMethod::Get);
        assert!(matches!(
            converter.metadata_path(&orphan),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_standalone_import_resolves_owner_from_path() {
        let (store, converter, resource_id) = setup();
        let descriptor = EndpointDescriptor {
            base: ComponentDescriptor::default(),
            resource_name: "home".to_string(),
            resource_id: None,
            sub_path: "/submit".to_string(),
            http_method: HttpMethod::Post,
            response_kind: ResponseKind::ModelAsJson,
            headers: std::collections::BTreeMap::new(),
            model_attributes: vec![],
            code_ref: Some("code/endpoint/public/home-POST-/submit.js".to_string()),
        };
        let resources =
            MapResourceLoader::new().with_entry("code/endpoint/public/home-POST-/submit.js", "ok();");

        let first = converter
            .from_descriptor(
                descriptor.clone(),
                "config/endpoint/public/home-POST-/submit.yaml",
                &resources,
            )
            .unwrap();
        assert_eq!(first.resource_id, resource_id);
        assert_eq!(first.code, "ok();");

        let second = converter
            .from_descriptor(descriptor, "config/endpoint/public/home-POST-/submit.yaml", &resources)
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(store.list_endpoints().unwrap().len(), 1);
    }

    #[test]
    fn test_standalone_import_keeps_own_organization() {
        let store = Arc::new(SqliteComponentStore::in_memory().unwrap());
        let owner = store
            .save_resource(&UiResource::new("home", AccessScope::Public).with_organization(5))
            .unwrap();
        let converter = EndpointConverter::new(store.clone());
        let descriptor = EndpointDescriptor {
            base: ComponentDescriptor::default(),
            resource_name: "home".to_string(),
            resource_id: None,
            sub_path: "/submit".to_string(),
            http_method: HttpMethod::Post,
            response_kind: ResponseKind::Html,
            headers: std::collections::BTreeMap::new(),
            model_attributes: vec![],
            code_ref: None,
        };

        let endpoint = converter
            .from_descriptor(
                descriptor,
                "config/endpoint/public/org_5/home-POST-/submit.yaml",
                &MapResourceLoader::new(),
            )
            .unwrap();
        assert_eq!(endpoint.resource_id, owner.id.unwrap());
        assert_eq!(endpoint.organization_id, None);
    }

    #[test]
    fn test_standalone_import_with_unknown_owner_fails() {
        let (_store, converter, _) = setup();
        let descriptor = EndpointDescriptor {
            base: ComponentDescriptor::default(),
            resource_name: "home".to_string(),
            resource_id: None,
            sub_path: "/x".to_string(),
            http_method: HttpMethod::Get,
            response_kind: ResponseKind::Html,
            headers: std::collections::BTreeMap::new(),
            model_attributes: vec![],
            code_ref: None,
        };
        let err = converter
            .from_descriptor(
                descriptor,
                "config/endpoint/internal/home-GET-/x.yaml",
                &MapResourceLoader::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
