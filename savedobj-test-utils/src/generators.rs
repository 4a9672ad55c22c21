//! Proptest strategies for spaces, ids, and update payloads.

use proptest::prelude::*;
use savedobj_core::{Attributes, SpaceId, UpdateRequest};
use serde_json::Value;
use uuid::Uuid;

/// Any valid space id, the default one included.
pub fn arb_space_id() -> impl Strategy<Value = SpaceId> {
    prop_oneof![
        Just("default".to_string()),
        Just("space_1".to_string()),
        Just("space_2".to_string()),
        "[a-z][a-z0-9_-]{0,24}",
    ]
    .prop_filter_map("valid space id", |id| SpaceId::new(id).ok())
}

/// Space id other than `default`.
pub fn arb_non_default_space_id() -> impl Strategy<Value = SpaceId> {
    arb_space_id().prop_filter("non-default space", |space| space.as_str() != "default")
}

/// Lowercase hyphenated UUID.
pub fn arb_uuid_id() -> impl Strategy<Value = String> {
    any::<[u8; 16]>().prop_map(|bytes| Uuid::from_bytes(bytes).to_string())
}

/// Id that can never look like a UUID.
pub fn arb_unknown_id() -> impl Strategy<Value = String> {
    "[a-z ]{1,20}".prop_filter("not blank", |id| !id.trim().is_empty())
}

pub fn arb_attribute_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,40}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

pub fn arb_attributes() -> impl Strategy<Value = Attributes> {
    prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9_]{0,15}", arb_attribute_value(), 1..6)
        .prop_map(|map| map.into_iter().collect())
}

pub fn arb_update_request() -> impl Strategy<Value = UpdateRequest> {
    arb_attributes().prop_map(UpdateRequest::new)
}
