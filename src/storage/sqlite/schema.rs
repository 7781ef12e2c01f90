//! Schema for the `SQLite` component store and dynamic form tables.

use crate::{Error, Result};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::LazyLock;

/// Tables owned by the component store; forms may not reuse these names.
pub const RESERVED_TABLES: &[&str] = &[
    "privileges",
    "ui_resources",
    "endpoints",
    "forms",
    "event_listeners",
    "schedulers",
];

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").ok());

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS privileges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT '',
    privilege_group TEXT NOT NULL DEFAULT '',
    label TEXT NOT NULL DEFAULT '',
    module TEXT NOT NULL DEFAULT 'core',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS ui_resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    access_scope TEXT NOT NULL,
    organization_id INTEGER,
    required_privilege TEXT,
    resource_kind TEXT NOT NULL,
    category TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    embeddable INTEGER NOT NULL DEFAULT 0,
    include_in_sitemap INTEGER NOT NULL DEFAULT 0,
    module TEXT NOT NULL DEFAULT 'core',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_ui_resources_key
    ON ui_resources(name, access_scope, COALESCE(organization_id, -1));

CREATE TABLE IF NOT EXISTS endpoints (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id INTEGER NOT NULL REFERENCES ui_resources(id) ON DELETE CASCADE,
    sub_path TEXT NOT NULL,
    http_method TEXT NOT NULL,
    response_kind TEXT NOT NULL,
    headers TEXT NOT NULL DEFAULT '{}',
    model_attributes TEXT NOT NULL DEFAULT '[]',
    code TEXT NOT NULL DEFAULT '',
    organization_id INTEGER,
    module TEXT NOT NULL DEFAULT 'core',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_endpoints_key
    ON endpoints(resource_id, sub_path, http_method, COALESCE(organization_id, -1));

CREATE TABLE IF NOT EXISTS forms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    read_privilege TEXT,
    write_privilege TEXT,
    table_name TEXT NOT NULL,
    table_columns TEXT NOT NULL DEFAULT '[]',
    filter_columns TEXT NOT NULL DEFAULT '[]',
    show_on_dashboard INTEGER NOT NULL DEFAULT 0,
    register_api_controller INTEGER NOT NULL DEFAULT 0,
    register_html_controller INTEGER NOT NULL DEFAULT 0,
    code TEXT NOT NULL DEFAULT '',
    organization_id INTEGER,
    module TEXT NOT NULL DEFAULT 'core',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS event_listeners (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_name TEXT NOT NULL,
    consumer_class TEXT NOT NULL,
    consumer_method TEXT NOT NULL,
    consumer_parameter_class TEXT NOT NULL DEFAULT '',
    static_data_1 TEXT,
    static_data_2 TEXT,
    static_data_3 TEXT,
    static_data_4 TEXT,
    organization_id INTEGER,
    module TEXT NOT NULL DEFAULT 'core',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_event_listeners_key
    ON event_listeners(event_name, COALESCE(organization_id, -1));

CREATE TABLE IF NOT EXISTS schedulers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_data TEXT NOT NULL,
    cron_expression TEXT NOT NULL,
    on_master_only INTEGER NOT NULL DEFAULT 1,
    organization_id INTEGER,
    module TEXT NOT NULL DEFAULT 'core',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_schedulers_key
    ON schedulers(event_data, COALESCE(organization_id, -1));
";

/// Creates the component tables and natural-key indexes.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if any statement fails.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| Error::operation("create_component_schema", e))
}

/// Validates a dynamic table name.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the name is not a plain identifier or
/// collides with a component table.
pub fn validate_table_name(table_name: &str) -> Result<()> {
    if !IDENTIFIER
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(table_name))
    {
        return Err(Error::InvalidInput(format!(
            "'{table_name}' is not a valid table name"
        )));
    }
    if RESERVED_TABLES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(table_name))
    {
        return Err(Error::InvalidInput(format!(
            "table name '{table_name}' is reserved"
        )));
    }
    Ok(())
}

/// Creates the table backing a dynamic form if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the name is invalid or the statement fails.
pub fn ensure_form_table(conn: &Connection, table_name: &str) -> Result<()> {
    validate_table_name(table_name)?;

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{table_name}\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            organization_id INTEGER,
            created_on INTEGER,
            updated_on INTEGER
        )"
    );
    conn.execute(&sql, [])
        .map_err(|e| Error::operation("create_form_table", e))?;
    Ok(())
}

/// Returns whether a table exists.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the catalog query fails.
pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table_name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::operation("query_table_exists", e))?;
    Ok(found.is_some())
}
