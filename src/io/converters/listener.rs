//! Event listener converter.

use super::decode_metadata_path;
use crate::Result;
use crate::io::converter::ComponentConverter;
use crate::io::descriptors::{ComponentDescriptor, EventListenerDescriptor};
use crate::io::path_codec::{METADATA_EXTENSION, PathCodec, sanitize_name};
use crate::io::resources::ResourceLoader;
use crate::models::{ComponentKind, EventListener};
use crate::storage::ComponentStore;
use std::sync::Arc;

/// Converts event listeners. Listeners have no content file.
pub struct EventListenerConverter {
    store: Arc<dyn ComponentStore>,
}

impl EventListenerConverter {
    /// Creates the converter.
    #[must_use]
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }
}

impl ComponentConverter for EventListenerConverter {
    type Entity = EventListener;
    type Descriptor = EventListenerDescriptor;

    fn metadata_path(&self, entity: &EventListener) -> Result<String> {
        Ok(PathCodec::metadata(ComponentKind::Listener).encode(
            None,
            entity.organization_id,
            &sanitize_name(&entity.event_name),
            METADATA_EXTENSION,
        ))
    }

    fn to_descriptor(&self, entity: &EventListener) -> Result<EventListenerDescriptor> {
        let [data_1, data_2, data_3, data_4] = entity.static_data.clone();
        Ok(EventListenerDescriptor {
            base: ComponentDescriptor::new(&entity.module, entity.organization_id),
            event_name: entity.event_name.clone(),
            consumer_class: entity.consumer_class.clone(),
            consumer_method: entity.consumer_method.clone(),
            consumer_parameter_class: entity.consumer_parameter_class.clone(),
            static_data_1: data_1,
            static_data_2: data_2,
            static_data_3: data_3,
            static_data_4: data_4,
        })
    }

    fn from_descriptor(
        &self,
        descriptor: EventListenerDescriptor,
        path: &str,
        _resources: &dyn ResourceLoader,
    ) -> Result<EventListener> {
        let decoded = decode_metadata_path(ComponentKind::Listener, path)?;
        let organization_id = descriptor.base.organization_id.or(decoded.organization_id);

        let mut listener = match self
            .store
            .find_listener(&descriptor.event_name, organization_id)?
        {
            Some(existing) => existing,
            None => {
                let mut created = EventListener::new(
                    &descriptor.event_name,
                    &descriptor.consumer_class,
                    &descriptor.consumer_method,
                );
                created.organization_id = organization_id;
                created
            },
        };

        listener.consumer_class = descriptor.consumer_class;
        listener.consumer_method = descriptor.consumer_method;
        listener.consumer_parameter_class = descriptor.consumer_parameter_class;
        listener.static_data = [
            descriptor.static_data_1,
            descriptor.static_data_2,
            descriptor.static_data_3,
            descriptor.static_data_4,
        ];
        listener.module = descriptor.base.module;

        let saved = self.store.save_listener(&listener)?;
        tracing::debug!(event = %saved.event_name, "Imported event listener");
        Ok(saved)
    }
}
