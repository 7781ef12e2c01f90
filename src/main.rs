//! Binary entry point for compack.
//!
//! This binary provides the CLI interface for packaging components.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{BatchArgs, ComponentSelector, package_path};
use compack::config::CompackConfig;
use compack::io::{ConverterRegistry, ExportService, ImportService};
use compack::models::ComponentKind;
use compack::observability::{self, LoggingConfig};
use compack::security::PrivilegeCatalog;
use compack::storage::{ComponentStore, SqliteComponentStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Compack - export and import application components as portable packages.
#[derive(Parser)]
#[command(name = "compack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the component database (overrides configuration).
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Export stored components into a package directory or `.zip` archive.
    Export {
        /// Package target (default: configured package root).
        target: Option<PathBuf>,

        /// Only export components of this organization.
        #[arg(long)]
        org: Option<i64>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Import a package directory or `.zip` archive.
    Import {
        /// Package source (default: configured package root).
        source: Option<PathBuf>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Remove one component's files from a package directory.
    Remove {
        /// Package directory (default: configured package root).
        root: Option<PathBuf>,

        #[command(flatten)]
        selector: ComponentSelector,
    },

    /// List stored components.
    List {
        /// Only list this kind.
        #[arg(short, long)]
        kind: Option<ComponentKind>,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match CompackConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    if let Some(database) = &cli.database {
        config.database_path.clone_from(database);
    }

    if let Err(e) = observability::init(LoggingConfig::from_settings(
        Some(&config.logging),
        cli.verbose,
    )) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command. Returns `false` when a batch finished with
/// per-entity failures.
fn run_command(command: Commands, config: &CompackConfig) -> compack::Result<bool> {
    let store = Arc::new(SqliteComponentStore::new(&config.database_path)?);
    let dyn_store: Arc<dyn ComponentStore> = store.clone();
    let registry = Arc::new(ConverterRegistry::standard(
        Arc::clone(&dyn_store),
        Arc::new(PrivilegeCatalog::with_store(Arc::clone(&dyn_store))),
        store,
    ));
    let exporter = ExportService::new(Arc::clone(&registry), Arc::clone(&dyn_store));

    match command {
        Commands::Export { target, org, batch } => {
            let target = package_path(target, &config.package_root);
            commands::cmd_export(config, &exporter, &target, &batch, org)
        },
        Commands::Import { source, batch } => {
            let source = package_path(source, &config.package_root);
            let importer = ImportService::new(registry).with_package_root(&source);
            commands::cmd_import(config, &importer, &source, &batch)
        },
        Commands::Remove { root, selector } => {
            let root = package_path(root, &config.package_root);
            commands::cmd_remove(dyn_store.as_ref(), &exporter, &root, &selector).map(|()| true)
        },
        Commands::List { kind } => commands::cmd_list(dyn_store.as_ref(), kind).map(|()| true),
    }
}
