//! `SQLite`-backed component store.

use super::connection::{acquire_lock, configure_connection, open_connection};
use super::rows::{
    ENDPOINT_COLUMNS, FORM_COLUMNS, LISTENER_COLUMNS, PRIVILEGE_COLUMNS, RESOURCE_COLUMNS,
    SCHEDULER_COLUMNS, endpoint_from_row, form_from_row, listener_from_row, privilege_from_row,
    resource_from_row, scheduler_from_row,
};
use super::schema;
use crate::current_timestamp;
use crate::models::{
    AccessScope, Endpoint, EventListener, Form, HttpMethod, Privilege, Scheduler, UiResource,
};
use crate::security::PrivilegeToken;
use crate::storage::{ComponentStore, TableManager};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

/// `SQLite`-based component store.
///
/// Natural keys are backed by unique indexes, so a second insert of the same
/// logical component fails instead of duplicating it.
pub struct SqliteComponentStore {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the `SQLite` database.
    db_path: PathBuf,
}

impl SqliteComponentStore {
    /// Opens (or creates) a store at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = open_connection(&db_path)?;
        schema::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::operation("open_component_db_memory", e))?;
        configure_connection(&conn)?;
        schema::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Returns whether a table exists in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let conn = acquire_lock(&self.conn);
        schema::table_exists(&conn, table_name)
    }

    fn query_one<T, P: Params>(
        &self,
        operation: &str,
        sql: &str,
        params: P,
        map: RowMapper<T>,
    ) -> Result<Option<T>> {
        let conn = acquire_lock(&self.conn);
        conn.query_row(sql, params, map)
            .optional()
            .map_err(|e| Error::operation(operation, e))
    }

    fn query_all<T, P: Params>(
        &self,
        operation: &str,
        sql: &str,
        params: P,
        map: RowMapper<T>,
    ) -> Result<Vec<T>> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::operation(operation, e))?;
        let rows = stmt
            .query_map(params, map)
            .map_err(|e| Error::operation(operation, e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::operation(operation, e))
    }

    /// Runs an INSERT (returning the new rowid) or an UPDATE by identity.
    fn upsert<P: Params>(
        &self,
        operation: &str,
        id: Option<i64>,
        insert_sql: &str,
        update_sql: &str,
        params: P,
    ) -> Result<i64> {
        let conn = acquire_lock(&self.conn);
        match id {
            None => {
                conn.execute(insert_sql, params)
                    .map_err(|e| Error::operation(operation, e))?;
                Ok(conn.last_insert_rowid())
            },
            Some(id) => {
                let changed = conn
                    .execute(update_sql, params)
                    .map_err(|e| Error::operation(operation, e))?;
                if changed == 0 {
                    return Err(Error::InvalidInput(format!(
                        "{operation}: no row with id {id}"
                    )));
                }
                Ok(id)
            },
        }
    }
}

/// Stamps timestamps onto a copy of an entity about to be saved.
fn stamp(id: Option<i64>, created_at: u64) -> (u64, u64) {
    let now = current_timestamp();
    if id.is_none() || created_at == 0 {
        (now, now)
    } else {
        (created_at, now)
    }
}

fn privilege_name(token: Option<&PrivilegeToken>) -> Option<&str> {
    token.map(PrivilegeToken::as_str)
}

fn to_json<T: serde::Serialize>(operation: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::operation(operation, e))
}

impl TableManager for SqliteComponentStore {
    fn ensure_table_exists(&self, table_name: &str) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        schema::ensure_form_table(&conn, table_name)?;
        tracing::debug!(table = table_name, "Ensured form table exists");
        Ok(())
    }
}

#[allow(clippy::cast_possible_wrap)]
impl ComponentStore for SqliteComponentStore {
    fn find_resource(
        &self,
        name: &str,
        access_scope: AccessScope,
        organization_id: Option<i64>,
    ) -> Result<Option<UiResource>> {
        self.query_one(
            "find_resource",
            &format!(
                "SELECT {RESOURCE_COLUMNS} FROM ui_resources
                 WHERE name = ?1 AND access_scope = ?2 AND organization_id IS ?3"
            ),
            params![name, access_scope.as_str(), organization_id],
            resource_from_row,
        )
    }

    fn find_resource_by_id(&self, id: i64) -> Result<Option<UiResource>> {
        self.query_one(
            "find_resource_by_id",
            &format!("SELECT {RESOURCE_COLUMNS} FROM ui_resources WHERE id = ?1"),
            params![id],
            resource_from_row,
        )
    }

    fn save_resource(&self, resource: &UiResource) -> Result<UiResource> {
        let (created_at, updated_at) = stamp(resource.id, resource.created_at);
        let id = self.upsert(
            "save_resource",
            resource.id,
            "INSERT INTO ui_resources
             (name, access_scope, organization_id, required_privilege, resource_kind, category,
              content, embeddable, include_in_sitemap, module, created_at, updated_at)
             VALUES (?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            "UPDATE ui_resources SET
             name = ?2, access_scope = ?3, organization_id = ?4, required_privilege = ?5,
             resource_kind = ?6, category = ?7, content = ?8, embeddable = ?9,
             include_in_sitemap = ?10, module = ?11, created_at = ?12, updated_at = ?13
             WHERE id = ?1",
            params![
                resource.id,
                resource.name,
                resource.access_scope.as_str(),
                resource.organization_id,
                privilege_name(resource.required_privilege.as_ref()),
                resource.resource_kind.as_str(),
                resource.category.as_str(),
                resource.content,
                resource.embeddable,
                resource.include_in_sitemap,
                resource.module,
                created_at as i64,
                updated_at as i64,
            ],
        )?;

        Ok(UiResource {
            id: Some(id),
            created_at,
            updated_at,
            ..resource.clone()
        })
    }

    fn list_resources(&self) -> Result<Vec<UiResource>> {
        self.query_all(
            "list_resources",
            &format!("SELECT {RESOURCE_COLUMNS} FROM ui_resources ORDER BY id"),
            [],
            resource_from_row,
        )
    }

    fn find_endpoint(
        &self,
        resource_id: i64,
        sub_path: &str,
        http_method: HttpMethod,
        organization_id: Option<i64>,
    ) -> Result<Option<Endpoint>> {
        self.query_one(
            "find_endpoint",
            &format!(
                "SELECT {ENDPOINT_COLUMNS} FROM endpoints
                 WHERE resource_id = ?1 AND sub_path = ?2 AND http_method = ?3
                   AND organization_id IS ?4"
            ),
            params![resource_id, sub_path, http_method.as_str(), organization_id],
            endpoint_from_row,
        )
    }

    fn endpoints_for_resource(&self, resource_id: i64) -> Result<Vec<Endpoint>> {
        self.query_all(
            "endpoints_for_resource",
            &format!("SELECT {ENDPOINT_COLUMNS} FROM endpoints WHERE resource_id = ?1 ORDER BY id"),
            params![resource_id],
            endpoint_from_row,
        )
    }

    fn save_endpoint(&self, endpoint: &Endpoint) -> Result<Endpoint> {
        let (created_at, updated_at) = stamp(endpoint.id, endpoint.created_at);
        let headers = to_json("serialize_endpoint_headers", &endpoint.headers)?;
        let attributes = to_json("serialize_model_attributes", &endpoint.model_attributes)?;
        let id = self.upsert(
            "save_endpoint",
            endpoint.id,
            "INSERT INTO endpoints
             (resource_id, sub_path, http_method, response_kind, headers, model_attributes,
              code, organization_id, module, created_at, updated_at)
             VALUES (?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            "UPDATE endpoints SET
             resource_id = ?2, sub_path = ?3, http_method = ?4, response_kind = ?5,
             headers = ?6, model_attributes = ?7, code = ?8, organization_id = ?9,
             module = ?10, created_at = ?11, updated_at = ?12
             WHERE id = ?1",
            params![
                endpoint.id,
                endpoint.resource_id,
                endpoint.sub_path,
                endpoint.http_method.as_str(),
                endpoint.response_kind.as_str(),
                headers,
                attributes,
                endpoint.code,
                endpoint.organization_id,
                endpoint.module,
                created_at as i64,
                updated_at as i64,
            ],
        )?;

        Ok(Endpoint {
            id: Some(id),
            created_at,
            updated_at,
            ..endpoint.clone()
        })
    }

    fn list_endpoints(&self) -> Result<Vec<Endpoint>> {
        self.query_all(
            "list_endpoints",
            &format!("SELECT {ENDPOINT_COLUMNS} FROM endpoints ORDER BY id"),
            [],
            endpoint_from_row,
        )
    }

    fn find_form(&self, name: &str) -> Result<Option<Form>> {
        self.query_one(
            "find_form",
            &format!("SELECT {FORM_COLUMNS} FROM forms WHERE name = ?1"),
            params![name],
            form_from_row,
        )
    }

    fn save_form(&self, form: &Form) -> Result<Form> {
        let (created_at, updated_at) = stamp(form.id, form.created_at);
        let table_columns = to_json("serialize_table_columns", &form.table_columns)?;
        let filter_columns = to_json("serialize_filter_columns", &form.filter_columns)?;
        let id = self.upsert(
            "save_form",
            form.id,
            "INSERT INTO forms
             (name, read_privilege, write_privilege, table_name, table_columns, filter_columns,
              show_on_dashboard, register_api_controller, register_html_controller, code,
              organization_id, module, created_at, updated_at)
             VALUES (?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            "UPDATE forms SET
             name = ?2, read_privilege = ?3, write_privilege = ?4, table_name = ?5,
             table_columns = ?6, filter_columns = ?7, show_on_dashboard = ?8,
             register_api_controller = ?9, register_html_controller = ?10, code = ?11,
             organization_id = ?12, module = ?13, created_at = ?14, updated_at = ?15
             WHERE id = ?1",
            params![
                form.id,
                form.name,
                privilege_name(form.read_privilege.as_ref()),
                privilege_name(form.write_privilege.as_ref()),
                form.table_name,
                table_columns,
                filter_columns,
                form.show_on_dashboard,
                form.register_api_controller,
                form.register_html_controller,
                form.code,
                form.organization_id,
                form.module,
                created_at as i64,
                updated_at as i64,
            ],
        )?;

        Ok(Form {
            id: Some(id),
            created_at,
            updated_at,
            ..form.clone()
        })
    }

    fn list_forms(&self) -> Result<Vec<Form>> {
        self.query_all(
            "list_forms",
            &format!("SELECT {FORM_COLUMNS} FROM forms ORDER BY id"),
            [],
            form_from_row,
        )
    }

    fn find_listener(
        &self,
        event_name: &str,
        organization_id: Option<i64>,
    ) -> Result<Option<EventListener>> {
        self.query_one(
            "find_listener",
            &format!(
                "SELECT {LISTENER_COLUMNS} FROM event_listeners
                 WHERE event_name = ?1 AND organization_id IS ?2"
            ),
            params![event_name, organization_id],
            listener_from_row,
        )
    }

    fn save_listener(&self, listener: &EventListener) -> Result<EventListener> {
        let (created_at, updated_at) = stamp(listener.id, listener.created_at);
        let [data_1, data_2, data_3, data_4] = &listener.static_data;
        let id = self.upsert(
            "save_listener",
            listener.id,
            "INSERT INTO event_listeners
             (event_name, consumer_class, consumer_method, consumer_parameter_class,
              static_data_1, static_data_2, static_data_3, static_data_4,
              organization_id, module, created_at, updated_at)
             VALUES (?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            "UPDATE event_listeners SET
             event_name = ?2, consumer_class = ?3, consumer_method = ?4,
             consumer_parameter_class = ?5, static_data_1 = ?6, static_data_2 = ?7,
             static_data_3 = ?8, static_data_4 = ?9, organization_id = ?10, module = ?11,
             created_at = ?12, updated_at = ?13
             WHERE id = ?1",
            params![
                listener.id,
                listener.event_name,
                listener.consumer_class,
                listener.consumer_method,
                listener.consumer_parameter_class,
                data_1,
                data_2,
                data_3,
                data_4,
                listener.organization_id,
                listener.module,
                created_at as i64,
                updated_at as i64,
            ],
        )?;

        Ok(EventListener {
            id: Some(id),
            created_at,
            updated_at,
            ..listener.clone()
        })
    }

    fn list_listeners(&self) -> Result<Vec<EventListener>> {
        self.query_all(
            "list_listeners",
            &format!("SELECT {LISTENER_COLUMNS} FROM event_listeners ORDER BY id"),
            [],
            listener_from_row,
        )
    }

    fn find_scheduler(
        &self,
        event_data: &str,
        organization_id: Option<i64>,
    ) -> Result<Option<Scheduler>> {
        self.query_one(
            "find_scheduler",
            &format!(
                "SELECT {SCHEDULER_COLUMNS} FROM schedulers
                 WHERE event_data = ?1 AND organization_id IS ?2"
            ),
            params![event_data, organization_id],
            scheduler_from_row,
        )
    }

    fn save_scheduler(&self, scheduler: &Scheduler) -> Result<Scheduler> {
        let (created_at, updated_at) = stamp(scheduler.id, scheduler.created_at);
        let id = self.upsert(
            "save_scheduler",
            scheduler.id,
            "INSERT INTO schedulers
             (event_data, cron_expression, on_master_only, organization_id, module,
              created_at, updated_at)
             VALUES (?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            "UPDATE schedulers SET
             event_data = ?2, cron_expression = ?3, on_master_only = ?4,
             organization_id = ?5, module = ?6, created_at = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                scheduler.id,
                scheduler.event_data,
                scheduler.cron_expression,
                scheduler.on_master_only,
                scheduler.organization_id,
                scheduler.module,
                created_at as i64,
                updated_at as i64,
            ],
        )?;

        Ok(Scheduler {
            id: Some(id),
            created_at,
            updated_at,
            ..scheduler.clone()
        })
    }

    fn list_schedulers(&self) -> Result<Vec<Scheduler>> {
        self.query_all(
            "list_schedulers",
            &format!("SELECT {SCHEDULER_COLUMNS} FROM schedulers ORDER BY id"),
            [],
            scheduler_from_row,
        )
    }

    fn find_privilege(&self, name: &str) -> Result<Option<Privilege>> {
        self.query_one(
            "find_privilege",
            &format!("SELECT {PRIVILEGE_COLUMNS} FROM privileges WHERE name = ?1"),
            params![name],
            privilege_from_row,
        )
    }

    fn save_privilege(&self, privilege: &Privilege) -> Result<Privilege> {
        let (created_at, updated_at) = stamp(privilege.id, privilege.created_at);
        let id = self.upsert(
            "save_privilege",
            privilege.id,
            "INSERT INTO privileges
             (name, category, privilege_group, label, module, created_at, updated_at)
             VALUES (?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            "UPDATE privileges SET
             name = ?2, category = ?3, privilege_group = ?4, label = ?5, module = ?6,
             created_at = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                privilege.id,
                privilege.name,
                privilege.category,
                privilege.group,
                privilege.label,
                privilege.module,
                created_at as i64,
                updated_at as i64,
            ],
        )?;

        Ok(Privilege {
            id: Some(id),
            created_at,
            updated_at,
            ..privilege.clone()
        })
    }

    fn list_privileges(&self) -> Result<Vec<Privilege>> {
        self.query_all(
            "list_privileges",
            &format!("SELECT {PRIVILEGE_COLUMNS} FROM privileges ORDER BY id"),
            [],
            privilege_from_row,
        )
    }
}
