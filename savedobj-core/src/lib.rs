//! savedobj core - shared types for saved-object update contracts
//!
//! Spaces and their prefixing rules, saved objects and update bodies,
//! principals and permissions, the error bodies observed at the API
//! boundary, and the collaborator traits the verifier is built from.

pub mod error;
pub mod error_body;
pub mod object;
pub mod principal;
pub mod space;
pub mod traits;

pub use error::{CoreError, CoreResult, FixtureError, TransportError};
pub use error_body::{ErrorBody, ErrorKind, Rejection, LEGACY_UPDATE_PRIVILEGE};
pub use object::{
    format_timestamp, Attributes, ObjectType, SavedObject, UpdateRequest, UpdatedObjectBody,
};
pub use principal::{Action, Credentials, Permission, PermissionSet};
pub use space::{SpaceId, SpaceLayout, DEFAULT_SPACE_ID};
pub use traits::{FixtureLoader, RawResponse, SavedObjectsTransport};
