//! Data models for compack.
//!
//! Entities mirror the rows kept by the component store. Each carries an
//! optional identity (assigned on first save) and a natural key used to
//! recognise the same logical component across export/import cycles.

mod component;
mod domain;
mod endpoint;
mod form;
mod listener;
mod privilege;
mod resource;

pub use component::{Component, ComponentEntity};
pub use domain::{AccessScope, ComponentKind, DEFAULT_MODULE};
pub use endpoint::{Endpoint, HttpMethod, ResponseKind};
pub use form::Form;
pub use listener::{EventListener, Scheduler};
pub use privilege::Privilege;
pub use resource::{ResourceCategory, ResourceKind, UiResource};
