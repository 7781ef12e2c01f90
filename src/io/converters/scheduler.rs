//! Scheduler converter.

use super::decode_metadata_path;
use crate::Result;
use crate::io::converter::ComponentConverter;
use crate::io::descriptors::{ComponentDescriptor, SchedulerDescriptor};
use crate::io::path_codec::{METADATA_EXTENSION, PathCodec, sanitize_name};
use crate::io::resources::ResourceLoader;
use crate::models::{ComponentKind, Scheduler};
use crate::storage::ComponentStore;
use std::sync::Arc;

/// Converts schedulers. The document name is the sanitized event data.
pub struct SchedulerConverter {
    store: Arc<dyn ComponentStore>,
}

impl SchedulerConverter {
    /// Creates the converter.
    #[must_use]
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }
}

impl ComponentConverter for SchedulerConverter {
    type Entity = Scheduler;
    type Descriptor = SchedulerDescriptor;

    fn metadata_path(&self, entity: &Scheduler) -> Result<String> {
        Ok(PathCodec::metadata(ComponentKind::Scheduler).encode(
            None,
            entity.organization_id,
            &sanitize_name(&entity.event_data),
            METADATA_EXTENSION,
        ))
    }

    fn to_descriptor(&self, entity: &Scheduler) -> Result<SchedulerDescriptor> {
        Ok(SchedulerDescriptor {
            base: ComponentDescriptor::new(&entity.module, entity.organization_id),
            event_data: entity.event_data.clone(),
            cron_expression: entity.cron_expression.clone(),
            on_master_only: entity.on_master_only,
        })
    }

    fn from_descriptor(
        &self,
        descriptor: SchedulerDescriptor,
        path: &str,
        _resources: &dyn ResourceLoader,
    ) -> Result<Scheduler> {
        let decoded = decode_metadata_path(ComponentKind::Scheduler, path)?;
        let organization_id = descriptor.base.organization_id.or(decoded.organization_id);

        let mut scheduler = match self
            .store
            .find_scheduler(&descriptor.event_data, organization_id)?
        {
            Some(existing) => existing,
            None => {
                let mut created =
                    Scheduler::new(&descriptor.event_data, &descriptor.cron_expression);
                created.organization_id = organization_id;
                created
            },
        };

        scheduler.cron_expression = descriptor.cron_expression;
        scheduler.on_master_only = descriptor.on_master_only;
        scheduler.module = descriptor.base.module;

        let saved = self.store.save_scheduler(&scheduler)?;
        tracing::debug!(event_data = %saved.event_data, cron = %saved.cron_expression, "Imported scheduler");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_path_sanitizes_event_data() {
        let store = Arc::new(crate::storage::SqliteComponentStore::in_memory().unwrap());
        let converter = SchedulerConverter::new(store);
        let scheduler = Scheduler::new("cleanup:sessions daily", "0 0 3 * * *");
        assert_eq!(
            converter.metadata_path(&scheduler).unwrap(),
            "config/scheduler/cleanup_sessions_daily.yaml"
        );
    }
}
