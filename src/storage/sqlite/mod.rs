//! `SQLite` component store.
//!
//! ## Module Structure
//!
//! - [`connection`]: Connection handling (lock acquisition, pragmas)
//! - [`schema`]: Component tables, natural-key indexes and dynamic form tables
//! - `rows`: Row conversion for each component kind
//! - `store`: The [`SqliteComponentStore`] itself

pub mod connection;
mod rows;
pub mod schema;
mod store;

pub use connection::{acquire_lock, configure_connection, open_connection};
pub use store::SqliteComponentStore;
