//! Privilege converter. Privileges are always global.

use crate::Result;
use crate::io::converter::ComponentConverter;
use crate::io::descriptors::{ComponentDescriptor, PrivilegeDescriptor};
use crate::io::path_codec::{METADATA_EXTENSION, PathCodec, sanitize_name};
use crate::io::resources::ResourceLoader;
use crate::models::{ComponentKind, Privilege};
use crate::storage::ComponentStore;
use std::sync::Arc;

/// Converts privileges.
pub struct PrivilegeConverter {
    store: Arc<dyn ComponentStore>,
}

impl PrivilegeConverter {
    /// Creates the converter.
    #[must_use]
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }
}

impl ComponentConverter for PrivilegeConverter {
    type Entity = Privilege;
    type Descriptor = PrivilegeDescriptor;

    fn metadata_path(&self, entity: &Privilege) -> Result<String> {
        Ok(PathCodec::metadata(ComponentKind::Privilege).encode(
            None,
            None,
            &sanitize_name(&entity.name),
            METADATA_EXTENSION,
        ))
    }

    fn to_descriptor(&self, entity: &Privilege) -> Result<PrivilegeDescriptor> {
        Ok(PrivilegeDescriptor {
            base: ComponentDescriptor::new(&entity.module, None),
            name: entity.name.clone(),
            category: entity.category.clone(),
            group: entity.group.clone(),
            label: entity.label.clone(),
        })
    }

    fn from_descriptor(
        &self,
        descriptor: PrivilegeDescriptor,
        _path: &str,
        _resources: &dyn ResourceLoader,
    ) -> Result<Privilege> {
        if descriptor.base.organization_id.is_some() {
            tracing::warn!(
                name = %descriptor.name,
                "Ignoring organization on privilege; privileges are global"
            );
        }

        let mut privilege = self.store.find_privilege(&descriptor.name)?.unwrap_or_else(|| {
            Privilege::new(&descriptor.name, &descriptor.category, &descriptor.group)
        });
        privilege.category = descriptor.category;
        privilege.group = descriptor.group;
        privilege.label = if descriptor.label.is_empty() {
            descriptor.name
        } else {
            descriptor.label
        };
        privilege.module = descriptor.base.module;

        let saved = self.store.save_privilege(&privilege)?;
        tracing::debug!(name = %saved.name, "Imported privilege");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::resources::MapResourceLoader;
    use crate::storage::SqliteComponentStore;

    #[test]
    fn test_blank_label_defaults_to_name() {
        let store = Arc::new(SqliteComponentStore::in_memory().unwrap());
        let converter = PrivilegeConverter::new(store.clone());
        let descriptor = PrivilegeDescriptor {
            base: ComponentDescriptor::new("logistics", Some(1)),
            name: "canShip".to_string(),
            category: "data".to_string(),
            group: "logistics".to_string(),
            label: String::new(),
        };

        let saved = converter
            .from_descriptor(descriptor, "config/privilege/canShip.yaml", &MapResourceLoader::new())
            .unwrap();
        assert_eq!(saved.label, "canShip");
        assert_eq!(saved.module, "logistics");
        assert_eq!(converter.metadata_path(&saved).unwrap(), "config/privilege/canShip.yaml");
    }
}
