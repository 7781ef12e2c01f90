//! Import and export services.
//!
//! The touchpoints the surrounding HTTP/CLI layer needs: single-entity
//! export, file removal, single-descriptor import, and batch package
//! export/import with reports.

pub mod export;
pub mod import;

pub use export::{ExportFailure, ExportOptions, ExportReport, ExportService};
pub use import::{ImportFailure, ImportOptions, ImportReport, ImportService};
