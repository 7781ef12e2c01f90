//! Per-type converters.
//!
//! | Kind | Converter | Content | Children |
//! |------|-----------|---------|----------|
//! | UI resource | [`UiResourceConverter`] | `resources/resource/...` | endpoints |
//! | Endpoint | [`EndpointConverter`] | `code/endpoint/...` | - |
//! | Form | [`FormConverter`] | `code/form/...` | - |
//! | Event listener | [`EventListenerConverter`] | - | - |
//! | Scheduler | [`SchedulerConverter`] | - | - |
//! | Privilege | [`PrivilegeConverter`] | - | - |

mod endpoint;
mod form;
mod listener;
mod privilege;
mod resource;
mod scheduler;

pub use endpoint::EndpointConverter;
pub use form::FormConverter;
pub use listener::EventListenerConverter;
pub use privilege::PrivilegeConverter;
pub use resource::UiResourceConverter;
pub use scheduler::SchedulerConverter;

use super::path_codec::{DecodedPath, PathCodec};
use crate::models::ComponentKind;
use crate::{Error, Result};

/// Codec for the content files of a kind that has them.
fn content_codec(kind: ComponentKind) -> Result<PathCodec> {
    PathCodec::content(kind)
        .ok_or_else(|| Error::UnrecognizedType(format!("{kind} components have no content files")))
}

/// Decodes the scope carried by a metadata document path.
fn decode_metadata_path(kind: ComponentKind, path: &str) -> Result<DecodedPath> {
    PathCodec::metadata(kind).decode(path)
}
