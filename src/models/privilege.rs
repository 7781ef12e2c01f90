//! Dynamic privilege entity.

use super::domain::DEFAULT_MODULE;

/// A dynamically defined access-control privilege.
///
/// Privileges are always global. Natural key: `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    /// Store identity, `None` until first save.
    pub id: Option<i64>,
    /// Unique privilege name.
    pub name: String,
    /// Privilege category, e.g. `data` or `admin`.
    pub category: String,
    /// Group the privilege is listed under.
    pub group: String,
    /// Human-readable label.
    pub label: String,
    /// Owning application module.
    pub module: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl Privilege {
    /// Creates an unsaved privilege.
    #[must_use]
    pub fn new(name: impl Into<String>, category: impl Into<String>, group: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: None,
            label: name.clone(),
            name,
            category: category.into(),
            group: group.into(),
            module: DEFAULT_MODULE.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
