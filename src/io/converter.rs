//! Per-type converter contract and the shared write/delete mechanics.
//!
//! A converter knows, for one entity kind, where the entity's content and
//! metadata go in a package, how to build its descriptor, and how to rebuild
//! the entity from a descriptor. Writing and deleting are the same for every
//! kind and live in [`write_component`] and [`remove_component_files`].

use super::descriptors::{Descriptor, DescriptorType};
use super::resources::ResourceLoader;
use super::session::ExportSession;
use crate::models::{Component, ComponentEntity, ComponentKind};
use crate::{Error, Result};
use std::path::Path;

/// Package locations of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPaths {
    /// Content file, if the kind has content.
    pub content: Option<String>,
    /// Metadata document.
    pub metadata: String,
}

/// Converter for one entity kind.
pub trait ComponentConverter: Send + Sync {
    /// Entity type handled by this converter.
    type Entity: ComponentEntity;
    /// Descriptor type produced by this converter.
    type Descriptor: DescriptorType;

    /// Where the raw content of `entity` is written, or `None` if the kind has
    /// no content file.
    fn content_path(&self, _entity: &Self::Entity) -> Result<Option<String>> {
        Ok(None)
    }

    /// The raw content of `entity`. Empty for kinds without content.
    fn content<'a>(&self, _entity: &'a Self::Entity) -> &'a str {
        ""
    }

    /// Where the metadata document of `entity` is written.
    fn metadata_path(&self, entity: &Self::Entity) -> Result<String>;

    /// Builds the descriptor of `entity`, including nested children.
    fn to_descriptor(&self, entity: &Self::Entity) -> Result<Self::Descriptor>;

    /// Lookup-or-create: rebuilds and persists the entity described by
    /// `descriptor`, found at package path `path`, then cascades into any
    /// embedded children.
    fn from_descriptor(
        &self,
        descriptor: Self::Descriptor,
        path: &str,
        resources: &dyn ResourceLoader,
    ) -> Result<Self::Entity>;

    /// Writes `entity` into the session and returns its descriptor.
    ///
    /// Parent kinds override this to write their children into the same
    /// session first.
    fn export(
        &self,
        entity: &Self::Entity,
        session: &mut ExportSession,
    ) -> Result<Self::Descriptor> {
        let descriptor = self.to_descriptor(entity)?;
        write_component(self, entity, &descriptor, session)?;
        Ok(descriptor)
    }
}

/// Writes the content (when present and non-empty) and the metadata document
/// of one entity, skipping paths the session already wrote with the same
/// bytes.
///
/// Empty content for a kind that normally has content is not written; the
/// session counts it and logs a warning.
///
/// # Errors
///
/// Returns an error if a path cannot be computed, the descriptor cannot be
/// serialized, another entity already wrote different bytes to one of the
/// paths, or the sink fails.
pub fn write_component<C: ComponentConverter + ?Sized>(
    converter: &C,
    entity: &C::Entity,
    descriptor: &C::Descriptor,
    session: &mut ExportSession,
) -> Result<()> {
    let owner = format!(
        "{} {}",
        <C::Entity as ComponentEntity>::KIND,
        entity.natural_key()
    );
    if let Some(content_path) = converter.content_path(entity)? {
        let content = converter.content(entity);
        if content.is_empty() {
            session.record_missing_content(&content_path);
        } else {
            session.write_once(&content_path, content.as_bytes(), &owner)?;
        }
    }

    let metadata_path = converter.metadata_path(entity)?;
    let document = serde_yaml_ng::to_string(descriptor)
        .map_err(|e| Error::operation("serialize_descriptor", e))?;
    session.write_once(&metadata_path, document.as_bytes(), &owner)?;
    Ok(())
}

/// Removes the content and metadata files of an entity from a package
/// directory, then removes each parent directory left empty (one level).
///
/// Missing files are ignored.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if an existing file cannot be removed.
pub fn remove_component_files(root: &Path, paths: &EntryPaths) -> Result<usize> {
    let mut removed = 0;
    for relative in paths.content.iter().chain(std::iter::once(&paths.metadata)) {
        let target = root.join(relative);
        if !target.is_file() {
            continue;
        }
        std::fs::remove_file(&target).map_err(|e| Error::operation("remove_package_entry", e))?;
        removed += 1;

        if let Some(parent) = target.parent()
            && parent != root
            && is_empty_dir(parent)
        {
            std::fs::remove_dir(parent).map_err(|e| Error::operation("remove_package_dir", e))?;
        }
    }
    Ok(removed)
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

/// Loads a content reference, or returns empty content when there is none.
pub(crate) fn load_content(
    reference: Option<&str>,
    resources: &dyn ResourceLoader,
) -> Result<String> {
    reference.map_or_else(|| Ok(String::new()), |path| resources.load_text(path))
}

/// Object-safe view of a converter over [`Component`] and [`Descriptor`].
///
/// The registry stores converters of every kind behind this trait.
pub trait DynConverter: Send + Sync {
    /// Kind handled by the converter.
    fn kind(&self) -> ComponentKind;

    /// Writes a component into the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if the component is of another kind.
    fn export_component(
        &self,
        component: &Component,
        session: &mut ExportSession,
    ) -> Result<Descriptor>;

    /// Builds the descriptor of a component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if the component is of another kind.
    fn describe(&self, component: &Component) -> Result<Descriptor>;

    /// Computes the package paths of a component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if the component is of another kind.
    fn entry_paths(&self, component: &Component) -> Result<EntryPaths>;

    /// Imports a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if the descriptor is of another kind.
    fn import_descriptor(
        &self,
        descriptor: Descriptor,
        path: &str,
        resources: &dyn ResourceLoader,
    ) -> Result<Component>;
}

fn entity_of<C: ComponentConverter>(component: &Component) -> Result<&C::Entity> {
    C::Entity::from_component(component).ok_or_else(|| {
        Error::UnrecognizedType(format!(
            "{} converter cannot handle a {} component",
            C::Entity::KIND,
            component.kind()
        ))
    })
}

impl<C: ComponentConverter> DynConverter for C {
    fn kind(&self) -> ComponentKind {
        C::Entity::KIND
    }

    fn export_component(
        &self,
        component: &Component,
        session: &mut ExportSession,
    ) -> Result<Descriptor> {
        let entity = entity_of::<C>(component)?;
        Ok(self.export(entity, session)?.into_descriptor())
    }

    fn describe(&self, component: &Component) -> Result<Descriptor> {
        let entity = entity_of::<C>(component)?;
        Ok(self.to_descriptor(entity)?.into_descriptor())
    }

    fn entry_paths(&self, component: &Component) -> Result<EntryPaths> {
        let entity = entity_of::<C>(component)?;
        Ok(EntryPaths {
            content: self.content_path(entity)?,
            metadata: self.metadata_path(entity)?,
        })
    }

    fn import_descriptor(
        &self,
        descriptor: Descriptor,
        path: &str,
        resources: &dyn ResourceLoader,
    ) -> Result<Component> {
        let found = descriptor.kind();
        let typed = C::Descriptor::from_descriptor(descriptor).ok_or_else(|| {
            Error::UnrecognizedType(format!(
                "{} converter cannot import a {found} descriptor",
                C::Descriptor::KIND
            ))
        })?;
        Ok(self.from_descriptor(typed, path, resources)?.into_component())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_component_files_prunes_empty_parent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("config/form/org_4")).unwrap();
        std::fs::create_dir_all(root.join("code/form")).unwrap();
        std::fs::write(root.join("config/form/org_4/orders.yaml"), "name: orders").unwrap();
        std::fs::write(root.join("code/form/orders.js"), "x").unwrap();
        std::fs::write(root.join("code/form/other.js"), "y").unwrap();

        let removed = remove_component_files(
            root,
            &EntryPaths {
                content: Some("code/form/orders.js".to_string()),
                metadata: "config/form/org_4/orders.yaml".to_string(),
            },
        )
        .unwrap();

        assert_eq!(removed, 2);
        assert!(!root.join("config/form/org_4").exists());
        assert!(root.join("config/form").exists());
        assert!(root.join("code/form/other.js").exists());
    }

    #[test]
    fn test_remove_component_files_ignores_missing() {
        let dir = TempDir::new().unwrap();
        let removed = remove_component_files(
            dir.path(),
            &EntryPaths {
                content: None,
                metadata: "config/privilege/canShip.yaml".to_string(),
            },
        )
        .unwrap();
        assert_eq!(removed, 0);
    }
}
