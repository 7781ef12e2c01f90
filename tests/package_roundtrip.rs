//! Package export/import integration tests.
//!
//! Exercises the full path from stored entities to a package on disk (or in a
//! zip archive) and back into a fresh store:
//! - Round trip of every component kind
//! - Idempotent re-import
//! - Dedup of entries shared within one export
//! - Cascade of embedded endpoints
//! - The `home` page with one `POST /submit` endpoint
//! - Archive packages
//! - Names that collide on one path, and endpoints whose organization differs
//!   from their owner's

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use compack::io::{
    ConverterRegistry, ExportOptions, ExportService, ExportSession, ImportOptions, ImportService,
    MapResourceLoader,
};
use compack::models::{
    AccessScope, Component, ComponentKind, Endpoint, EventListener, Form, HttpMethod, Privilege,
    ResourceCategory, ResourceKind, ResponseKind, Scheduler, UiResource,
};
use compack::security::{PrivilegeCatalog, PrivilegeLookup};
use compack::storage::{ComponentStore, SqliteComponentStore};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

struct Env {
    store: Arc<SqliteComponentStore>,
    exporter: ExportService,
    importer: ImportService,
}

fn env() -> Env {
    let store = Arc::new(SqliteComponentStore::in_memory().expect("in-memory store"));
    let registry = Arc::new(ConverterRegistry::standard(
        store.clone(),
        Arc::new(PrivilegeCatalog::with_store(store.clone())),
        store.clone(),
    ));
    Env {
        exporter: ExportService::new(registry.clone(), store.clone()),
        importer: ImportService::new(registry),
        store,
    }
}

fn token(name: &str) -> compack::PrivilegeToken {
    PrivilegeCatalog::builtin()
        .with_privilege(name)
        .token(name)
        .unwrap()
}

/// Stores the `home` page with its `POST /submit` endpoint.
fn seed_home(store: &SqliteComponentStore) -> (UiResource, Endpoint) {
    let resource = store
        .save_resource(
            &UiResource::new("home", AccessScope::Public)
                .with_kind(ResourceKind::Html)
                .with_category(ResourceCategory::Page)
                .with_content("<h1>Home</h1>"),
        )
        .unwrap();
    let endpoint = store
        .save_endpoint(
            &Endpoint::new(resource.id.unwrap(), "/submit", HttpMethod::Post)
                .with_code("return submit(request);")
                .with_response_kind(ResponseKind::ModelAsJson)
                .with_header("Cache-Control", "no-store")
                .with_model_attribute("order"),
        )
        .unwrap();
    (resource, endpoint)
}

/// Stores one entity of every kind, organization-scoped where possible.
fn seed_all(store: &SqliteComponentStore) {
    store
        .save_privilege(&Privilege::new("canShip", "data", "logistics").with_label("Can ship"))
        .unwrap();

    let mut form = Form::new("shipments", "dynamic_shipments")
        .with_code("validate(form);")
        .with_privileges(token("canShip"), token("manageOrgData"))
        .with_table_columns(vec!["id".to_string(), "carrier".to_string()]);
    form.filter_columns = vec!["carrier".to_string()];
    form.show_on_dashboard = true;
    form.register_api_controller = true;
    form.organization_id = Some(3);
    store.save_form(&form).unwrap();

    let resource = store
        .save_resource(
            &UiResource::new("dashboard", AccessScope::Organization)
                .with_organization(3)
                .with_kind(ResourceKind::Js)
                .with_category(ResourceCategory::Component)
                .with_content("export default {};")
                .with_required_privilege(token("readOrgData")),
        )
        .unwrap();
    let mut endpoint = Endpoint::new(resource.id.unwrap(), "/stats/daily", HttpMethod::Get)
        .with_code("return stats();");
    endpoint.organization_id = Some(3);
    store.save_endpoint(&endpoint).unwrap();

    let mut listener = EventListener::new("SHIPMENT_SENT", "ship.Notifier", "notify");
    listener.organization_id = Some(3);
    listener.consumer_parameter_class = "ship.Shipment".to_string();
    listener.static_data = [Some("sms".to_string()), None, Some("priority".to_string()), None];
    store.save_listener(&listener).unwrap();

    let mut scheduler = Scheduler::new("cleanup:shipments", "0 0 4 * * *");
    scheduler.on_master_only = false;
    scheduler.organization_id = Some(3);
    store.save_scheduler(&scheduler).unwrap();
}

fn strip_resource(mut r: UiResource) -> UiResource {
    r.id = None;
    r.created_at = 0;
    r.updated_at = 0;
    r
}

fn strip_endpoint(mut e: Endpoint) -> Endpoint {
    e.id = None;
    e.resource_id = 0;
    e.created_at = 0;
    e.updated_at = 0;
    e
}

fn strip_form(mut f: Form) -> Form {
    f.id = None;
    f.created_at = 0;
    f.updated_at = 0;
    f
}

fn strip_listener(mut l: EventListener) -> EventListener {
    l.id = None;
    l.created_at = 0;
    l.updated_at = 0;
    l
}

fn strip_scheduler(mut s: Scheduler) -> Scheduler {
    s.id = None;
    s.created_at = 0;
    s.updated_at = 0;
    s
}

fn strip_privilege(mut p: Privilege) -> Privilege {
    p.id = None;
    p.created_at = 0;
    p.updated_at = 0;
    p
}

fn all_endpoints(store: &SqliteComponentStore) -> Vec<Endpoint> {
    store
        .list_endpoints()
        .unwrap()
        .into_iter()
        .map(strip_endpoint)
        .collect()
}

fn assert_same_contents(source: &SqliteComponentStore, target: &SqliteComponentStore) {
    let strip_all = |v: Vec<UiResource>| v.into_iter().map(strip_resource).collect::<Vec<_>>();
    assert_eq!(
        strip_all(source.list_resources().unwrap()),
        strip_all(target.list_resources().unwrap())
    );
    assert_eq!(all_endpoints(source), all_endpoints(target));

    let forms = |s: &SqliteComponentStore| {
        s.list_forms()
            .unwrap()
            .into_iter()
            .map(strip_form)
            .collect::<Vec<_>>()
    };
    assert_eq!(forms(source), forms(target));

    let listeners = |s: &SqliteComponentStore| {
        s.list_listeners()
            .unwrap()
            .into_iter()
            .map(strip_listener)
            .collect::<Vec<_>>()
    };
    assert_eq!(listeners(source), listeners(target));

    let schedulers = |s: &SqliteComponentStore| {
        s.list_schedulers()
            .unwrap()
            .into_iter()
            .map(strip_scheduler)
            .collect::<Vec<_>>()
    };
    assert_eq!(schedulers(source), schedulers(target));

    let privileges = |s: &SqliteComponentStore| {
        s.list_privileges()
            .unwrap()
            .into_iter()
            .map(strip_privilege)
            .collect::<Vec<_>>()
    };
    assert_eq!(privileges(source), privileges(target));
}

fn row_counts(store: &SqliteComponentStore) -> Vec<usize> {
    ComponentKind::all()
        .iter()
        .map(|kind| store.list(*kind).unwrap().len())
        .collect()
}

fn assert_file(root: &Path, relative: &str) {
    assert!(
        root.join(relative).is_file(),
        "expected package entry {relative}"
    );
}

// ============================================================================
// Concrete Scenario
// ============================================================================

#[test]
fn test_home_page_with_submit_endpoint() {
    let source = env();
    let (resource, endpoint) = seed_home(&source.store);
    let dir = TempDir::new().unwrap();

    let report = source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();
    assert!(report.is_success());

    assert_file(dir.path(), "config/resource/public/home.yaml");
    assert_file(dir.path(), "config/endpoint/public/home-POST-/submit.yaml");
    assert_file(dir.path(), "resources/resource/public/home.html");
    assert_file(dir.path(), "code/endpoint/public/home-POST-/submit.js");

    let document =
        std::fs::read_to_string(dir.path().join("config/resource/public/home.yaml")).unwrap();
    assert!(document.contains("contentRef: resources/resource/public/home.html"));
    assert!(!document.contains(&dir.path().display().to_string()));

    let target = env();
    let imported = target
        .importer
        .import_package(dir.path(), &ImportOptions::default())
        .unwrap();
    assert!(imported.is_success());

    let restored = target
        .store
        .find_resource("home", AccessScope::Public, None)
        .unwrap()
        .unwrap();
    assert_eq!(strip_resource(restored.clone()), strip_resource(resource));

    let children = target
        .store
        .endpoints_for_resource(restored.id.unwrap())
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].resource_id, restored.id.unwrap());
    assert_eq!(strip_endpoint(children[0].clone()), strip_endpoint(endpoint));
}

// ============================================================================
// Round Trip and Idempotence
// ============================================================================

#[test]
fn test_every_kind_round_trips_through_a_directory() {
    let source = env();
    seed_all(&source.store);
    let dir = TempDir::new().unwrap();

    let report = source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.total_exported(), 6);
    assert_eq!(report.missing_content, 0);

    assert_file(dir.path(), "config/privilege/canShip.yaml");
    assert_file(dir.path(), "config/form/org_3/shipments.yaml");
    assert_file(dir.path(), "code/form/org_3/shipments.js");
    assert_file(dir.path(), "resources/resource/organization/org_3/dashboard.js");
    assert_file(
        dir.path(),
        "code/endpoint/organization/org_3/dashboard-GET-/stats/daily.js",
    );
    assert_file(dir.path(), "config/listener/org_3/SHIPMENT_SENT.yaml");
    assert_file(dir.path(), "config/scheduler/org_3/cleanup_shipments.yaml");

    let target = env();
    let imported = target
        .importer
        .import_package(dir.path(), &ImportOptions::default())
        .unwrap();
    assert!(imported.is_success(), "{:?}", imported.failures);
    assert!(imported.manifest.is_some());

    assert!(target.store.table_exists("dynamic_shipments").unwrap());
    assert_same_contents(&source.store, &target.store);
}

#[test]
fn test_second_import_updates_in_place() {
    let source = env();
    seed_all(&source.store);
    seed_home(&source.store);
    let dir = TempDir::new().unwrap();
    source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();

    let target = env();
    target
        .importer
        .import_package(dir.path(), &ImportOptions::default())
        .unwrap();
    let first_counts = row_counts(&target.store);
    let first_scheduler = target
        .store
        .find_scheduler("cleanup:shipments", Some(3))
        .unwrap()
        .unwrap();

    let document = dir.path().join("config/scheduler/org_3/cleanup_shipments.yaml");
    let edited = std::fs::read_to_string(&document)
        .unwrap()
        .replace("0 0 4 * * *", "0 30 4 * * *");
    std::fs::write(&document, edited).unwrap();

    let second = target
        .importer
        .import_package(dir.path(), &ImportOptions::default())
        .unwrap();
    assert!(second.is_success());
    assert_eq!(row_counts(&target.store), first_counts);

    let updated = target
        .store
        .find_scheduler("cleanup:shipments", Some(3))
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, first_scheduler.id);
    assert_eq!(updated.cron_expression, "0 30 4 * * *");
}

// ============================================================================
// Dedup and Cascade
// ============================================================================

#[test]
fn test_shared_entries_are_written_once_per_session() {
    let env = env();
    let (resource, endpoint) = seed_home(&env.store);
    let dir = TempDir::new().unwrap();

    let mut session = ExportSession::directory(dir.path());
    env.exporter
        .export_entity(&Component::from(resource), &mut session)
        .unwrap();
    let after_resource = session.stats();
    env.exporter
        .export_entity(&Component::from(endpoint), &mut session)
        .unwrap();
    let stats = session.finish().unwrap();

    assert_eq!(after_resource.entries_written, 4);
    assert_eq!(stats.entries_written, 4);
    assert_eq!(stats.duplicates_skipped, 2);
}

#[test]
fn test_resource_document_cascades_to_every_endpoint() {
    let source = env();
    let resource = source
        .store
        .save_resource(&UiResource::new("orders", AccessScope::Global).with_content("<ul/>"))
        .unwrap();
    let owner = resource.id.unwrap();
    for (sub_path, method) in [
        ("/list", HttpMethod::Get),
        ("/create", HttpMethod::Post),
        ("/item", HttpMethod::Delete),
    ] {
        source
            .store
            .save_endpoint(&Endpoint::new(owner, sub_path, method).with_code(format!("// {sub_path}")))
            .unwrap();
    }
    let dir = TempDir::new().unwrap();
    source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();

    let target = env();
    let report = target
        .importer
        .import_package(
            dir.path(),
            &ImportOptions::default().with_kinds([ComponentKind::Resource]),
        )
        .unwrap();
    assert_eq!(report.total_imported(), 1);

    let restored = target
        .store
        .find_resource("orders", AccessScope::Global, None)
        .unwrap()
        .unwrap();
    assert_eq!(
        target
            .store
            .endpoints_for_resource(restored.id.unwrap())
            .unwrap()
            .len(),
        3
    );
    assert_eq!(all_endpoints(&source.store), all_endpoints(&target.store));
}

#[test]
fn test_empty_content_is_skipped_and_counted() {
    let env = env();
    env.store
        .save_resource(&UiResource::new("blank", AccessScope::Internal))
        .unwrap();
    let dir = TempDir::new().unwrap();

    let report = env
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();
    assert_eq!(report.missing_content, 1);
    assert_file(dir.path(), "config/resource/internal/blank.yaml");
    assert!(!dir.path().join("resources/resource/internal/blank.html").exists());
}

#[test]
fn test_names_colliding_on_one_path_are_reported() {
    let source = env();
    source
        .store
        .save_scheduler(&Scheduler::new("cleanup:a", "0 0 1 * * *"))
        .unwrap();
    source
        .store
        .save_scheduler(&Scheduler::new("cleanup_a", "0 0 2 * * *"))
        .unwrap();
    let dir = TempDir::new().unwrap();

    let report = source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();
    assert!(!report.is_success());
    assert_eq!(report.exported.get(&ComponentKind::Scheduler), Some(&1));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, ComponentKind::Scheduler);
    assert_eq!(report.failures[0].key, "cleanup_a");
    assert!(report.failures[0].error.contains("cleanup:a"));
    assert_eq!(report.duplicates_skipped, 0);

    let target = env();
    target
        .importer
        .import_package(dir.path(), &ImportOptions::default())
        .unwrap();
    let restored = target.store.list_schedulers().unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].event_data, "cleanup:a");
    assert_eq!(restored[0].cron_expression, "0 0 1 * * *");

    let strict = source.exporter.export_package(
        &dir.path().join("strict"),
        &ExportOptions::default().with_fail_fast(true),
    );
    assert!(matches!(strict, Err(compack::Error::InvalidInput(_))));
}

#[test]
fn test_endpoint_organization_differs_from_owner() {
    let source = env();
    let resource = source
        .store
        .save_resource(
            &UiResource::new("home", AccessScope::Public)
                .with_organization(5)
                .with_content("<h1>Home</h1>"),
        )
        .unwrap();
    source
        .store
        .save_endpoint(
            &Endpoint::new(resource.id.unwrap(), "/submit", HttpMethod::Post)
                .with_code("return submit(request);"),
        )
        .unwrap();
    let dir = TempDir::new().unwrap();
    source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();
    assert_file(dir.path(), "config/endpoint/public/org_5/home-POST-/submit.yaml");

    let target = env();
    for _ in 0..2 {
        let report = target
            .importer
            .import_package(dir.path(), &ImportOptions::default())
            .unwrap();
        assert!(report.is_success(), "{:?}", report.failures);
    }

    let restored = target
        .store
        .find_resource("home", AccessScope::Public, Some(5))
        .unwrap()
        .unwrap();
    let endpoints = target.store.list_endpoints().unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].organization_id, None);
    assert_eq!(endpoints[0].resource_id, restored.id.unwrap());
    assert_eq!(all_endpoints(&source.store), all_endpoints(&target.store));
}

// ============================================================================
// Archive Packages
// ============================================================================

#[test]
fn test_archive_package_round_trip() {
    let source = env();
    seed_all(&source.store);
    seed_home(&source.store);
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("out").join("bundle.zip");

    let report = source
        .exporter
        .export_package(&archive, &ExportOptions::default())
        .unwrap();
    assert!(report.is_success());

    let entries = MapResourceLoader::from_archive(File::open(&archive).unwrap()).unwrap();
    let paths = entries.paths();
    assert_eq!(paths.len(), report.entries_written);
    assert!(paths.contains(&"manifest.yaml"));
    assert!(paths.contains(&"code/endpoint/public/home-POST-/submit.js"));

    let target = env();
    let imported = target
        .importer
        .import_package(&archive, &ImportOptions::default())
        .unwrap();
    assert!(imported.is_success(), "{:?}", imported.failures);
    assert_same_contents(&source.store, &target.store);
}

// ============================================================================
// Single-entity Touchpoints
// ============================================================================

#[test]
fn test_export_to_file_and_remove_exported_files() {
    let env = env();
    let (resource, _) = seed_home(&env.store);
    let dir = TempDir::new().unwrap();
    let component = Component::from(resource);

    env.exporter.export_to_file(&component, dir.path()).unwrap();
    assert_file(dir.path(), "resources/resource/public/home.html");
    assert_file(dir.path(), "code/endpoint/public/home-POST-/submit.js");

    let removed = env
        .exporter
        .remove_exported_files(&component, dir.path())
        .unwrap();
    assert_eq!(removed, 2);
    assert!(!dir.path().join("resources/resource/public").exists());
    assert!(!dir.path().join("config/resource/public").exists());
    // endpoint files are owned by the endpoint entity
    assert_file(dir.path(), "code/endpoint/public/home-POST-/submit.js");
}

#[test]
fn test_import_descriptor_from_package_root() {
    let source = env();
    seed_home(&source.store);
    let dir = TempDir::new().unwrap();
    source
        .exporter
        .export_package(dir.path(), &ExportOptions::default())
        .unwrap();

    let target = env();
    let path = "config/resource/public/home.yaml";
    let yaml = std::fs::read_to_string(dir.path().join(path)).unwrap();
    let descriptor = compack::Descriptor::from_yaml(ComponentKind::Resource, &yaml).unwrap();

    let importer = target.importer.with_package_root(dir.path());
    let component = importer.import_descriptor(descriptor, path, None).unwrap();

    assert_eq!(component.kind(), ComponentKind::Resource);
    assert_eq!(target.store.list_endpoints().unwrap().len(), 1);
}
