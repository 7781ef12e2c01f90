//! Storage collaborator traits.

mod component;
mod tables;

pub use component::ComponentStore;
pub use tables::TableManager;
