//! Access-control collaborators.
//!
//! Privilege enforcement lives outside this crate; only the name ↔ token
//! lookup needed to (de)serialize privilege references is provided here.

mod privileges;

pub use privileges::{BuiltinPrivilege, PrivilegeCatalog, PrivilegeLookup, PrivilegeToken};
