//! Dynamic table collaborator.

use crate::Result;

/// Creates the tables backing dynamic forms.
///
/// The schema engine itself is external; import only needs to be sure the
/// table exists before the form row referencing it is persisted.
pub trait TableManager: Send + Sync {
    /// Ensures a table with the given name exists.
    ///
    /// Idempotent: calling it for an existing table is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid identifier or the table
    /// cannot be created.
    fn ensure_table_exists(&self, table_name: &str) -> Result<()>;
}
