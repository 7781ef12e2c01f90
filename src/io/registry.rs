//! Converter registry.
//!
//! An explicit table from [`ComponentKind`] to converter, built once at
//! startup. The export table is keyed by the entity's kind; the import table
//! is keyed by the descriptor's kind and populated separately, since no entity
//! exists yet when a descriptor is imported.

use super::converter::DynConverter;
use super::converters::{
    EndpointConverter, EventListenerConverter, FormConverter, PrivilegeConverter,
    SchedulerConverter, UiResourceConverter,
};
use super::descriptors::Descriptor;
use crate::models::{Component, ComponentKind};
use crate::security::PrivilegeLookup;
use crate::storage::{ComponentStore, TableManager};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps component kinds to converters, per direction.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    exporters: HashMap<ComponentKind, Arc<dyn DynConverter>>,
    importers: HashMap<ComponentKind, Arc<dyn DynConverter>>,
}

impl ConverterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry with a converter for every kind, in both
    /// directions.
    #[must_use]
    pub fn standard(
        store: Arc<dyn ComponentStore>,
        privileges: Arc<dyn PrivilegeLookup>,
        tables: Arc<dyn TableManager>,
    ) -> Self {
        let endpoints = Arc::new(EndpointConverter::new(Arc::clone(&store)));
        let converters: Vec<Arc<dyn DynConverter>> = vec![
            Arc::new(PrivilegeConverter::new(Arc::clone(&store))),
            Arc::new(FormConverter::new(
                Arc::clone(&store),
                Arc::clone(&privileges),
                tables,
            )),
            Arc::new(UiResourceConverter::new(
                Arc::clone(&store),
                privileges,
                Arc::clone(&endpoints),
            )),
            endpoints,
            Arc::new(EventListenerConverter::new(Arc::clone(&store))),
            Arc::new(SchedulerConverter::new(store)),
        ];

        converters.into_iter().fold(Self::new(), |registry, converter| {
            registry
                .with_exporter(Arc::clone(&converter))
                .with_importer(converter)
        })
    }

    /// Registers a converter for the export direction.
    #[must_use]
    pub fn with_exporter(mut self, converter: Arc<dyn DynConverter>) -> Self {
        self.exporters.insert(converter.kind(), converter);
        self
    }

    /// Registers a converter for the import direction.
    #[must_use]
    pub fn with_importer(mut self, converter: Arc<dyn DynConverter>) -> Self {
        self.importers.insert(converter.kind(), converter);
        self
    }

    /// Returns the export converter for a kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if none is registered.
    pub fn exporter(&self, kind: ComponentKind) -> Result<&Arc<dyn DynConverter>> {
        self.exporters
            .get(&kind)
            .ok_or_else(|| Error::UnrecognizedType(format!("no exporter registered for {kind}")))
    }

    /// Returns the import converter for a kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if none is registered.
    pub fn importer(&self, kind: ComponentKind) -> Result<&Arc<dyn DynConverter>> {
        self.importers
            .get(&kind)
            .ok_or_else(|| Error::UnrecognizedType(format!("no importer registered for {kind}")))
    }

    /// Returns the export converter for a component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if none is registered.
    pub fn for_component(&self, component: &Component) -> Result<&Arc<dyn DynConverter>> {
        self.exporter(component.kind())
    }

    /// Returns the import converter for a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if none is registered.
    pub fn for_descriptor(&self, descriptor: &Descriptor) -> Result<&Arc<dyn DynConverter>> {
        self.importer(descriptor.kind())
    }

    /// Kinds registered for export, in import dependency order.
    #[must_use]
    pub fn export_kinds(&self) -> Vec<ComponentKind> {
        let mut kinds: Vec<ComponentKind> = self.exporters.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut exporters: Vec<_> = self.exporters.keys().collect();
        exporters.sort();
        let mut importers: Vec<_> = self.importers.keys().collect();
        importers.sort();
        f.debug_struct("ConverterRegistry")
            .field("exporters", &exporters)
            .field("importers", &importers)
            .finish()
    }
}
