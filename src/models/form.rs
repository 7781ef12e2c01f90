//! Dynamic form entity.

use super::domain::DEFAULT_MODULE;
use crate::security::PrivilegeToken;

/// A dynamic form/table definition.
///
/// Natural key: `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Store identity, `None` until first save.
    pub id: Option<i64>,
    /// Unique form name.
    pub name: String,
    /// Privilege required to read rows.
    pub read_privilege: Option<PrivilegeToken>,
    /// Privilege required to write rows.
    pub write_privilege: Option<PrivilegeToken>,
    /// Name of the generated table backing the form.
    pub table_name: String,
    /// Columns shown in the table view.
    pub table_columns: Vec<String>,
    /// Columns offered as filters.
    pub filter_columns: Vec<String>,
    /// Whether the form appears on the organization dashboard.
    pub show_on_dashboard: bool,
    /// Whether a JSON CRUD API is registered for the form.
    pub register_api_controller: bool,
    /// Whether HTML CRUD pages are registered for the form.
    pub register_html_controller: bool,
    /// Form definition script.
    pub code: String,
    /// Tenant scope; `None` means global.
    pub organization_id: Option<i64>,
    /// Owning application module.
    pub module: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl Form {
    /// Creates an unsaved form backed by the given table.
    #[must_use]
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            read_privilege: None,
            write_privilege: None,
            table_name: table_name.into(),
            table_columns: Vec::new(),
            filter_columns: Vec::new(),
            show_on_dashboard: false,
            register_api_controller: false,
            register_html_controller: false,
            code: String::new(),
            organization_id: None,
            module: DEFAULT_MODULE.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Sets the definition script.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the read and write privileges.
    #[must_use]
    pub fn with_privileges(mut self, read: PrivilegeToken, write: PrivilegeToken) -> Self {
        self.read_privilege = Some(read);
        self.write_privilege = Some(write);
        self
    }

    /// Sets the table columns.
    #[must_use]
    pub fn with_table_columns(mut self, columns: Vec<String>) -> Self {
        self.table_columns = columns;
        self
    }
}
