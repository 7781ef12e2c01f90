//! Form converter.

use super::{content_codec, decode_metadata_path};
use crate::io::converter::{ComponentConverter, load_content};
use crate::io::descriptors::{ComponentDescriptor, FormDescriptor};
use crate::io::path_codec::{METADATA_EXTENSION, PathCodec, sanitize_name};
use crate::io::resources::ResourceLoader;
use crate::models::{ComponentKind, Form};
use crate::security::PrivilegeLookup;
use crate::storage::{ComponentStore, TableManager};
use crate::Result;
use std::sync::Arc;

const CODE_EXTENSION: &str = "js";

/// Converts dynamic forms.
///
/// Import makes sure the form's backing table exists before the form row is
/// saved.
pub struct FormConverter {
    store: Arc<dyn ComponentStore>,
    privileges: Arc<dyn PrivilegeLookup>,
    tables: Arc<dyn TableManager>,
}

impl FormConverter {
    /// Creates the converter.
    #[must_use]
    pub fn new(
        store: Arc<dyn ComponentStore>,
        privileges: Arc<dyn PrivilegeLookup>,
        tables: Arc<dyn TableManager>,
    ) -> Self {
        Self {
            store,
            privileges,
            tables,
        }
    }
}

impl ComponentConverter for FormConverter {
    type Entity = Form;
    type Descriptor = FormDescriptor;

    fn content_path(&self, entity: &Form) -> Result<Option<String>> {
        Ok(Some(content_codec(ComponentKind::Form)?.encode(
            None,
            entity.organization_id,
            &sanitize_name(&entity.name),
            CODE_EXTENSION,
        )))
    }

    fn content<'a>(&self, entity: &'a Form) -> &'a str {
        &entity.code
    }

    fn metadata_path(&self, entity: &Form) -> Result<String> {
        Ok(PathCodec::metadata(ComponentKind::Form).encode(
            None,
            entity.organization_id,
            &sanitize_name(&entity.name),
            METADATA_EXTENSION,
        ))
    }

    fn to_descriptor(&self, entity: &Form) -> Result<FormDescriptor> {
        let code_ref = if entity.code.is_empty() {
            None
        } else {
            self.content_path(entity)?
        };

        Ok(FormDescriptor {
            base: ComponentDescriptor::new(&entity.module, entity.organization_id),
            name: entity.name.clone(),
            read_privilege: entity.read_privilege.as_ref().map(|t| t.as_str().to_string()),
            write_privilege: entity.write_privilege.as_ref().map(|t| t.as_str().to_string()),
            table_name: entity.table_name.clone(),
            table_columns: entity.table_columns.clone(),
            filter_columns: entity.filter_columns.clone(),
            show_on_dashboard: entity.show_on_dashboard,
            register_api_controller: entity.register_api_controller,
            register_html_controller: entity.register_html_controller,
            code_ref,
        })
    }

    fn from_descriptor(
        &self,
        descriptor: FormDescriptor,
        path: &str,
        resources: &dyn ResourceLoader,
    ) -> Result<Form> {
        let decoded = decode_metadata_path(ComponentKind::Form, path)?;
        let read_privilege = self
            .privileges
            .optional_token(descriptor.read_privilege.as_deref())?;
        let write_privilege = self
            .privileges
            .optional_token(descriptor.write_privilege.as_deref())?;
        let code = load_content(descriptor.code_ref.as_deref(), resources)?;

        let mut form = self
            .store
            .find_form(&descriptor.name)?
            .unwrap_or_else(|| Form::new(&descriptor.name, &descriptor.table_name));

        form.organization_id = descriptor.base.organization_id.or(decoded.organization_id);
        form.read_privilege = read_privilege;
        form.write_privilege = write_privilege;
        form.table_name = descriptor.table_name;
        form.table_columns = descriptor.table_columns;
        form.filter_columns = descriptor.filter_columns;
        form.show_on_dashboard = descriptor.show_on_dashboard;
        form.register_api_controller = descriptor.register_api_controller;
        form.register_html_controller = descriptor.register_html_controller;
        form.code = code;
        form.module = descriptor.base.module;

        self.tables.ensure_table_exists(&form.table_name)?;
        let saved = self.store.save_form(&form)?;
        tracing::debug!(name = %saved.name, table = %saved.table_name, "Imported form");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::io::resources::MapResourceLoader;
    use crate::security::PrivilegeCatalog;
    use crate::storage::SqliteComponentStore;

    fn descriptor(table: &str) -> FormDescriptor {
        FormDescriptor {
            base: ComponentDescriptor::default(),
            name: "orders".to_string(),
            read_privilege: Some("readOrgData".to_string()),
            write_privilege: Some("manageOrgData".to_string()),
            table_name: table.to_string(),
            table_columns: vec!["id".to_string(), "total".to_string()],
            filter_columns: vec!["total".to_string()],
            show_on_dashboard: true,
            register_api_controller: true,
            register_html_controller: false,
            code_ref: Some("code/form/orders.js".to_string()),
        }
    }

    fn converter(store: &Arc<SqliteComponentStore>) -> FormConverter {
        FormConverter::new(
            store.clone(),
            Arc::new(PrivilegeCatalog::builtin()),
            store.clone(),
        )
    }

    #[test]
    fn test_import_creates_table_before_saving() {
        let store = Arc::new(SqliteComponentStore::in_memory().unwrap());
        let resources = MapResourceLoader::new().with_entry("code/form/orders.js", "validate();");

        let form = converter(&store)
            .from_descriptor(descriptor("dynamic_orders"), "config/form/orders.yaml", &resources)
            .unwrap();

        assert!(store.table_exists("dynamic_orders").unwrap());
        assert_eq!(form.code, "validate();");
        assert_eq!(form.read_privilege.unwrap().as_str(), "readOrgData");
    }

    #[test]
    fn test_invalid_table_name_fails_without_saving() {
        let store = Arc::new(SqliteComponentStore::in_memory().unwrap());
        let resources = MapResourceLoader::new().with_entry("code/form/orders.js", "validate();");

        let err = converter(&store)
            .from_descriptor(descriptor("orders; --"), "config/form/orders.yaml", &resources)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(store.find_form("orders").unwrap().is_none());
    }

    #[test]
    fn test_organization_from_path() {
        let store = Arc::new(SqliteComponentStore::in_memory().unwrap());
        let resources = MapResourceLoader::new().with_entry("code/form/orders.js", "validate();");

        let form = converter(&store)
            .from_descriptor(
                descriptor("dynamic_orders"),
                "config/form/org_8/orders.yaml",
                &resources,
            )
            .unwrap();
        assert_eq!(form.organization_id, Some(8));
        assert_eq!(
            converter(&store).metadata_path(&form).unwrap(),
            "config/form/org_8/orders.yaml"
        );
    }
}
