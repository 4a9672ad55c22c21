//! Well-known contents of the `saved_objects/spaces` dataset that the update
//! scenarios target.

use savedobj_core::{ObjectType, UpdateRequest};

/// Dataset loaded before and unloaded after every scenario group.
pub const SPACES_DATASET: &str = "saved_objects/spaces";

/// Unprefixed id of the seeded space-aware visualization (one per space).
pub const SPACE_AWARE_ID: &str = "dd7caf20-9efd-11e7-acb3-3dab96693fab";

/// Id of the seeded object of the non-space-aware `globaltype`.
pub const NOT_SPACE_AWARE_ID: &str = "8121a00-8efd-21e7-1cb3-34ab966434445";

/// Id that never exists in any space.
pub const DOESNT_EXIST_ID: &str = "not an id";

/// Non-default spaces the dataset seeds a visualization into.
pub const SPACE_1: &str = "space_1";
pub const SPACE_2: &str = "space_2";

/// Version of every seeded object before the scenario updates it.
pub const SEEDED_VERSION: u64 = 1;

pub fn space_aware_type() -> ObjectType {
    ObjectType::visualization()
}

pub fn not_space_aware_type() -> ObjectType {
    ObjectType::globaltype()
}

/// Payload sent to space-aware objects (and to the unknown id).
pub fn space_aware_payload() -> UpdateRequest {
    UpdateRequest::single("title", "My second favorite vis")
}

/// Payload sent to the non-space-aware object.
pub fn not_space_aware_payload() -> UpdateRequest {
    UpdateRequest::single("name", "My second favorite")
}
