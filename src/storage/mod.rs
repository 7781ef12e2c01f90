//! Storage layer abstraction.
//!
//! Converters reach persisted components only through [`ComponentStore`] and
//! create form tables through [`TableManager`]. The bundled implementation of
//! both is [`SqliteComponentStore`].

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteComponentStore;
pub use traits::{ComponentStore, TableManager};
