//! Command handlers module.
//!
//! - `io.rs`: package export, import and file removal
//! - `list.rs`: stored component listing

mod io;
mod list;

use clap::Args;
use compack::models::{AccessScope, ComponentKind, HttpMethod};
use std::path::PathBuf;

pub use io::{cmd_export, cmd_import, cmd_remove};
pub use list::cmd_list;

/// Identifies one stored component by its natural key.
#[derive(Args, Debug)]
pub struct ComponentSelector {
    /// Component kind.
    #[arg(short, long)]
    pub kind: ComponentKind,

    /// Name: resource, form or privilege name, listener event name,
    /// scheduler event data, or the owning resource's name for an endpoint.
    #[arg(short, long)]
    pub name: String,

    /// Access scope of a resource or of an endpoint's owning resource.
    #[arg(long, default_value = "public")]
    pub scope: AccessScope,

    /// Organization identifier.
    #[arg(long)]
    pub org: Option<i64>,

    /// Endpoint HTTP method.
    #[arg(long, default_value = "GET")]
    pub method: HttpMethod,

    /// Endpoint sub-path.
    #[arg(long, default_value = "")]
    pub sub_path: String,
}

/// Options shared by export and import.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Restrict to these kinds (repeatable).
    #[arg(short, long = "kind")]
    pub kinds: Vec<ComponentKind>,

    /// Abort on the first failure.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Package location argument; falls back to the configured package root.
pub fn package_path(explicit: Option<PathBuf>, configured: &std::path::Path) -> PathBuf {
    explicit.unwrap_or_else(|| configured.to_path_buf())
}
