//! List command handler.

use compack::Result;
use compack::models::{Component, ComponentKind};
use compack::storage::ComponentStore;

/// Executes the list command.
pub fn cmd_list(store: &dyn ComponentStore, kind: Option<ComponentKind>) -> Result<()> {
    let kinds: Vec<ComponentKind> = kind.map_or_else(|| ComponentKind::all().to_vec(), |k| vec![k]);

    let mut total = 0;
    for kind in kinds {
        let components = store.list(kind)?;
        if components.is_empty() {
            continue;
        }
        println!("{kind} ({}):", components.len());
        for component in &components {
            println!("  {}", describe(component));
        }
        total += components.len();
    }

    if total == 0 {
        println!("No components stored.");
    }
    Ok(())
}

fn describe(component: &Component) -> String {
    let id = component
        .id()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!("#{id:<5} {}", component.natural_key())
}
