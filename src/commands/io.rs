//! Export, import and remove command handlers.

use super::{BatchArgs, ComponentSelector};
use compack::io::{ExportOptions, ExportService, ImportOptions, ImportService};
use compack::models::{Component, ComponentKind};
use compack::storage::ComponentStore;
use compack::{CompackConfig, Error, Result};
use std::path::Path;

/// Maximum number of failures printed in a summary.
const MAX_LISTED_FAILURES: usize = 10;

/// Executes the export command.
pub fn cmd_export(
    config: &CompackConfig,
    service: &ExportService,
    target: &Path,
    batch: &BatchArgs,
    org: Option<i64>,
) -> Result<bool> {
    let mut options = ExportOptions::default()
        .with_kinds(batch.kinds.iter().copied())
        .with_fail_fast(batch.fail_fast || config.fail_fast);
    if let Some(org) = org {
        options = options.with_organization(org);
    }

    let report = service.export_package(target, &options)?;

    println!("Export completed: {}", target.display());
    for (kind, count) in &report.exported {
        println!("  {kind:<10} {count}");
    }
    println!("  Entries written:    {}", report.entries_written);
    println!("  Duplicates skipped: {}", report.duplicates_skipped);
    println!("  Missing content:    {}", report.missing_content);

    print_failures(
        report
            .failures
            .iter()
            .map(|f| format!("{} {}: {}", f.kind, f.key, f.error)),
        report.failures.len(),
    );
    Ok(report.is_success())
}

/// Executes the import command.
pub fn cmd_import(
    config: &CompackConfig,
    service: &ImportService,
    source: &Path,
    batch: &BatchArgs,
) -> Result<bool> {
    let options = ImportOptions::default()
        .with_kinds(batch.kinds.iter().copied())
        .with_fail_fast(batch.fail_fast || config.fail_fast);

    let report = service.import_package(source, &options)?;

    println!("Import completed: {}", source.display());
    if let Some(manifest) = &report.manifest {
        println!(
            "  Package format v{}, created {}",
            manifest.format_version, manifest.created_at
        );
    }
    for (kind, count) in &report.imported {
        println!("  {kind:<10} {count}");
    }

    print_failures(
        report.failures.iter().map(|f| format!("{}: {}", f.path, f.error)),
        report.failures.len(),
    );
    Ok(report.is_success())
}

/// Executes the remove command.
pub fn cmd_remove(
    store: &dyn ComponentStore,
    service: &ExportService,
    root: &Path,
    selector: &ComponentSelector,
) -> Result<()> {
    let component = locate(store, selector)?;
    let removed = service.remove_exported_files(&component, root)?;
    println!(
        "Removed {removed} file(s) for {} {}",
        component.kind(),
        component.natural_key()
    );
    Ok(())
}

/// Looks up the stored component a selector names.
fn locate(store: &dyn ComponentStore, selector: &ComponentSelector) -> Result<Component> {
    let name = selector.name.as_str();
    let org = selector.org;
    let found: Option<Component> = match selector.kind {
        ComponentKind::Resource => store
            .find_resource(name, selector.scope, org)?
            .map(Component::from),
        ComponentKind::Endpoint => {
            match store.find_resource(name, selector.scope, org)?.and_then(|r| r.id) {
                Some(resource_id) => store
                    .find_endpoint(resource_id, &selector.sub_path, selector.method, org)?
                    .map(Component::from),
                None => None,
            }
        },
        ComponentKind::Form => store.find_form(name)?.map(Component::from),
        ComponentKind::Listener => store.find_listener(name, org)?.map(Component::from),
        ComponentKind::Scheduler => store.find_scheduler(name, org)?.map(Component::from),
        ComponentKind::Privilege => store.find_privilege(name)?.map(Component::from),
    };

    found.ok_or_else(|| {
        Error::InvalidInput(format!("no {} named '{name}' is stored", selector.kind))
    })
}

fn print_failures(lines: impl Iterator<Item = String>, total: usize) {
    if total == 0 {
        return;
    }
    println!();
    println!("Failures ({total}):");
    for line in lines.take(MAX_LISTED_FAILURES) {
        println!("  - {line}");
    }
    if total > MAX_LISTED_FAILURES {
        println!("  ... and {} more", total - MAX_LISTED_FAILURES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compack::models::{AccessScope, Endpoint, HttpMethod, UiResource};
    use compack::storage::SqliteComponentStore;

    fn selector(kind: ComponentKind, name: &str) -> ComponentSelector {
        ComponentSelector {
            kind,
            name: name.to_string(),
            scope: AccessScope::Public,
            org: None,
            method: HttpMethod::Get,
            sub_path: String::new(),
        }
    }

    #[test]
    fn test_locate_endpoint_through_owner() {
        let store = SqliteComponentStore::in_memory().unwrap();
        let resource = store
            .save_resource(&UiResource::new("home", AccessScope::Public))
            .unwrap();
        store
            .save_endpoint(&Endpoint::new(resource.id.unwrap(), "/submit", HttpMethod::Post))
            .unwrap();

        let mut wanted = selector(ComponentKind::Endpoint, "home");
        wanted.method = HttpMethod::Post;
        wanted.sub_path = "/submit".to_string();
        let component = locate(&store, &wanted).unwrap();
        assert_eq!(component.kind(), ComponentKind::Endpoint);

        wanted.method = HttpMethod::Get;
        assert!(matches!(locate(&store, &wanted), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_locate_missing_form() {
        let store = SqliteComponentStore::in_memory().unwrap();
        let result = locate(&store, &selector(ComponentKind::Form, "orders"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
