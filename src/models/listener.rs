//! Event listener and scheduler entities.

use super::domain::DEFAULT_MODULE;

/// An event listener registration.
///
/// Natural key: (`event_name`, `organization_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListener {
    /// Store identity, `None` until first save.
    pub id: Option<i64>,
    /// Name of the event the listener consumes.
    pub event_name: String,
    /// Consumer class name.
    pub consumer_class: String,
    /// Consumer method name.
    pub consumer_method: String,
    /// Consumer parameter class name.
    pub consumer_parameter_class: String,
    /// Generic static data slots passed to the consumer.
    pub static_data: [Option<String>; 4],
    /// Tenant scope; `None` means global.
    pub organization_id: Option<i64>,
    /// Owning application module.
    pub module: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl EventListener {
    /// Creates an unsaved listener.
    #[must_use]
    pub fn new(
        event_name: impl Into<String>,
        consumer_class: impl Into<String>,
        consumer_method: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            event_name: event_name.into(),
            consumer_class: consumer_class.into(),
            consumer_method: consumer_method.into(),
            consumer_parameter_class: String::new(),
            static_data: [None, None, None, None],
            organization_id: None,
            module: DEFAULT_MODULE.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// A cron-driven scheduler.
///
/// Natural key: (`event_data`, `organization_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    /// Store identity, `None` until first save.
    pub id: Option<i64>,
    /// Payload emitted on every tick.
    pub event_data: String,
    /// Cron expression.
    pub cron_expression: String,
    /// Whether the scheduler only fires on the master node.
    pub on_master_only: bool,
    /// Tenant scope; `None` means global.
    pub organization_id: Option<i64>,
    /// Owning application module.
    pub module: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl Scheduler {
    /// Creates an unsaved scheduler.
    #[must_use]
    pub fn new(event_data: impl Into<String>, cron_expression: impl Into<String>) -> Self {
        Self {
            id: None,
            event_data: event_data.into(),
            cron_expression: cron_expression.into(),
            on_master_only: true,
            organization_id: None,
            module: DEFAULT_MODULE.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }
}
