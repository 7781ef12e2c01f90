//! Row conversion for component tables.

use crate::models::{
    Endpoint, EventListener, Form, Privilege, Scheduler, UiResource,
};
use crate::security::PrivilegeToken;
use rusqlite::Row;
use rusqlite::types::Type;
use std::str::FromStr;

pub(crate) const PRIVILEGE_COLUMNS: &str =
    "id, name, category, privilege_group, label, module, created_at, updated_at";

pub(crate) const RESOURCE_COLUMNS: &str = "id, name, access_scope, organization_id, required_privilege, \
     resource_kind, category, content, embeddable, include_in_sitemap, module, created_at, updated_at";

pub(crate) const ENDPOINT_COLUMNS: &str = "id, resource_id, sub_path, http_method, response_kind, headers, \
     model_attributes, code, organization_id, module, created_at, updated_at";

pub(crate) const FORM_COLUMNS: &str = "id, name, read_privilege, write_privilege, table_name, table_columns, \
     filter_columns, show_on_dashboard, register_api_controller, register_html_controller, code, \
     organization_id, module, created_at, updated_at";

pub(crate) const LISTENER_COLUMNS: &str = "id, event_name, consumer_class, consumer_method, \
     consumer_parameter_class, static_data_1, static_data_2, static_data_3, static_data_4, \
     organization_id, module, created_at, updated_at";

pub(crate) const SCHEDULER_COLUMNS: &str =
    "id, event_data, cron_expression, on_master_only, organization_id, module, created_at, updated_at";

/// Parses an enum stored as text, surfacing bad values as conversion failures.
fn text_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = crate::Error>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn privilege_token(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<PrivilegeToken>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .filter(|name| !name.is_empty())
        .map(PrivilegeToken::from_stored))
}

fn json_column<T: serde::de::DeserializeOwned + Default>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    Ok(serde_json::from_str(&raw).unwrap_or_default())
}

#[allow(clippy::cast_sign_loss)]
fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

pub(crate) fn privilege_from_row(row: &Row<'_>) -> rusqlite::Result<Privilege> {
    Ok(Privilege {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        group: row.get(3)?,
        label: row.get(4)?,
        module: row.get(5)?,
        created_at: timestamp(row, 6)?,
        updated_at: timestamp(row, 7)?,
    })
}

pub(crate) fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<UiResource> {
    Ok(UiResource {
        id: row.get(0)?,
        name: row.get(1)?,
        access_scope: text_enum(row, 2)?,
        organization_id: row.get(3)?,
        required_privilege: privilege_token(row, 4)?,
        resource_kind: text_enum(row, 5)?,
        category: text_enum(row, 6)?,
        content: row.get(7)?,
        embeddable: row.get(8)?,
        include_in_sitemap: row.get(9)?,
        module: row.get(10)?,
        created_at: timestamp(row, 11)?,
        updated_at: timestamp(row, 12)?,
    })
}

pub(crate) fn endpoint_from_row(row: &Row<'_>) -> rusqlite::Result<Endpoint> {
    Ok(Endpoint {
        id: row.get(0)?,
        resource_id: row.get(1)?,
        sub_path: row.get(2)?,
        http_method: text_enum(row, 3)?,
        response_kind: text_enum(row, 4)?,
        headers: json_column(row, 5)?,
        model_attributes: json_column(row, 6)?,
        code: row.get(7)?,
        organization_id: row.get(8)?,
        module: row.get(9)?,
        created_at: timestamp(row, 10)?,
        updated_at: timestamp(row, 11)?,
    })
}

pub(crate) fn form_from_row(row: &Row<'_>) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        name: row.get(1)?,
        read_privilege: privilege_token(row, 2)?,
        write_privilege: privilege_token(row, 3)?,
        table_name: row.get(4)?,
        table_columns: json_column(row, 5)?,
        filter_columns: json_column(row, 6)?,
        show_on_dashboard: row.get(7)?,
        register_api_controller: row.get(8)?,
        register_html_controller: row.get(9)?,
        code: row.get(10)?,
        organization_id: row.get(11)?,
        module: row.get(12)?,
        created_at: timestamp(row, 13)?,
        updated_at: timestamp(row, 14)?,
    })
}

pub(crate) fn listener_from_row(row: &Row<'_>) -> rusqlite::Result<EventListener> {
    Ok(EventListener {
        id: row.get(0)?,
        event_name: row.get(1)?,
        consumer_class: row.get(2)?,
        consumer_method: row.get(3)?,
        consumer_parameter_class: row.get(4)?,
        static_data: [row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?],
        organization_id: row.get(9)?,
        module: row.get(10)?,
        created_at: timestamp(row, 11)?,
        updated_at: timestamp(row, 12)?,
    })
}

pub(crate) fn scheduler_from_row(row: &Row<'_>) -> rusqlite::Result<Scheduler> {
    Ok(Scheduler {
        id: row.get(0)?,
        event_data: row.get(1)?,
        cron_expression: row.get(2)?,
        on_master_only: row.get(3)?,
        organization_id: row.get(4)?,
        module: row.get(5)?,
        created_at: timestamp(row, 6)?,
        updated_at: timestamp(row, 7)?,
    })
}
