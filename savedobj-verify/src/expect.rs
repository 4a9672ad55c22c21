//! Typed expectations for update responses.
//!
//! Each expectation describes one complete response body. Checking is
//! structural: every field is compared and unknown fields are violations,
//! so a forbidden body that leaks `attributes` or `version` fails.
//! Server-generated fields (`id`, `updated_at`) are matched by pattern.

use once_cell::sync::Lazy;
use regex::Regex;
use savedobj_core::{
    Action, Attributes, ErrorBody, ObjectType, RawResponse, SpaceId, SpaceLayout,
    UpdatedObjectBody,
};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::fixtures;

/// UUID-like id with nothing before it.
pub const ANCHORED_ID_PATTERN: &str = r"^[0-9a-f-]{36}$";

/// UUID-like id, possibly preceded by a space prefix.
pub const SUFFIX_ID_PATTERN: &str = r"[0-9a-f-]{36}$";

/// ISO-8601 UTC timestamp with milliseconds.
pub const UPDATED_AT_PATTERN: &str = r"^[\d-]{10}T[\d:\.]{12}Z$";

static ANCHORED_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(ANCHORED_ID_PATTERN).expect("Invalid anchored id regex"));
static SUFFIX_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(SUFFIX_ID_PATTERN).expect("Invalid suffix id regex"));
static UPDATED_AT: Lazy<Regex> =
    Lazy::new(|| Regex::new(UPDATED_AT_PATTERN).expect("Invalid updated_at regex"));

// ============================================================================
// VIOLATIONS
// ============================================================================

/// A mismatch between an actual response and its expectation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("expected status {expected}, got {actual} with body {body}")]
    Status {
        expected: u16,
        actual: u16,
        body: Value,
    },

    #[error("field '{field}': expected {expected}, got {actual}")]
    Field {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("field '{field}' = {actual:?} does not match /{pattern}/")]
    Pattern {
        field: &'static str,
        pattern: &'static str,
        actual: String,
    },

    #[error("body is not {expected}: {reason} (body: {body})")]
    Shape {
        expected: &'static str,
        reason: String,
        body: Value,
    },
}

// ============================================================================
// EXPECTATIONS
// ============================================================================

/// How the returned `id` of an updated object is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMatch {
    /// The whole id is UUID-like (non-space-aware types).
    Anchored,
    /// The id ends UUID-like; a space prefix may precede it.
    Suffix,
}

impl IdMatch {
    fn regex(&self) -> &'static Regex {
        match self {
            IdMatch::Anchored => &*ANCHORED_ID,
            IdMatch::Suffix => &*SUFFIX_ID,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            IdMatch::Anchored => ANCHORED_ID_PATTERN,
            IdMatch::Suffix => SUFFIX_ID_PATTERN,
        }
    }
}

/// Expected success body.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedObject {
    pub object_type: ObjectType,
    pub id_match: IdMatch,
    pub version: u64,
    pub attributes: Attributes,
}

/// Expected response body of one update request.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Rejected by the legacy index-privilege layer.
    LegacyForbidden { username: String },
    /// Rejected by RBAC for the missing update permission on `object_type`.
    RbacForbidden { object_type: ObjectType },
    /// Object absent; `prefixed_id` includes the space prefix.
    NotFound {
        object_type: ObjectType,
        prefixed_id: String,
    },
    /// Update applied.
    Updated(ExpectedObject),
}

impl Expectation {
    /// Status code that normally accompanies this body.
    pub fn status_code(&self) -> u16 {
        match self {
            Expectation::LegacyForbidden { .. } | Expectation::RbacForbidden { .. } => 403,
            Expectation::NotFound { .. } => 404,
            Expectation::Updated(_) => 200,
        }
    }

    /// The exact error body this expectation describes, if it is a rejection.
    pub fn error_body(&self) -> Option<ErrorBody> {
        match self {
            Expectation::LegacyForbidden { username } => Some(ErrorBody::legacy_forbidden(username)),
            Expectation::RbacForbidden { object_type } => {
                Some(ErrorBody::rbac_forbidden(object_type, Action::Update))
            }
            Expectation::NotFound {
                object_type,
                prefixed_id,
            } => Some(ErrorBody::not_found(object_type, prefixed_id)),
            Expectation::Updated(_) => None,
        }
    }

    /// Check a response body against this expectation.
    pub fn check(&self, body: &Value) -> Result<(), ContractViolation> {
        match self {
            Expectation::Updated(expected) => check_updated(expected, body),
            _ => match self.error_body() {
                Some(expected) => check_error(&expected, body),
                None => Ok(()),
            },
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::LegacyForbidden { username } => {
                write!(f, "legacy forbidden for user [{}]", username)
            }
            Expectation::RbacForbidden { object_type } => {
                write!(f, "rbac forbidden for {}", object_type)
            }
            Expectation::NotFound {
                object_type,
                prefixed_id,
            } => write!(f, "not found [{}/{}]", object_type, prefixed_id),
            Expectation::Updated(expected) => write!(
                f,
                "updated {} at version {}",
                expected.object_type, expected.version
            ),
        }
    }
}

fn check_error(expected: &ErrorBody, body: &Value) -> Result<(), ContractViolation> {
    let actual: ErrorBody =
        serde_json::from_value(body.clone()).map_err(|e| ContractViolation::Shape {
            expected: "an error body",
            reason: e.to_string(),
            body: body.clone(),
        })?;

    compare("statusCode", &expected.status_code, &actual.status_code)?;
    compare("error", &expected.error, &actual.error)?;
    compare("message", &expected.message, &actual.message)?;
    Ok(())
}

fn check_updated(expected: &ExpectedObject, body: &Value) -> Result<(), ContractViolation> {
    let actual: UpdatedObjectBody =
        serde_json::from_value(body.clone()).map_err(|e| ContractViolation::Shape {
            expected: "an updated saved object",
            reason: e.to_string(),
            body: body.clone(),
        })?;

    if !expected.id_match.regex().is_match(&actual.id) {
        return Err(ContractViolation::Pattern {
            field: "id",
            pattern: expected.id_match.pattern(),
            actual: actual.id,
        });
    }
    if !UPDATED_AT.is_match(&actual.updated_at) {
        return Err(ContractViolation::Pattern {
            field: "updated_at",
            pattern: UPDATED_AT_PATTERN,
            actual: actual.updated_at,
        });
    }

    compare("type", &expected.object_type.as_str(), &actual.object_type.as_str())?;
    compare("version", &expected.version, &actual.version)?;
    if expected.attributes != actual.attributes {
        return Err(ContractViolation::Field {
            field: "attributes",
            expected: Value::Object(expected.attributes.clone()).to_string(),
            actual: Value::Object(actual.attributes).to_string(),
        });
    }
    Ok(())
}

fn compare<T>(field: &'static str, expected: &T, actual: &T) -> Result<(), ContractViolation>
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if expected == actual {
        Ok(())
    } else {
        Err(ContractViolation::Field {
            field,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        })
    }
}

// ============================================================================
// UPDATE TESTS
// ============================================================================

/// Expected status code and body of one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTest {
    pub status_code: u16,
    pub expectation: Expectation,
}

impl UpdateTest {
    pub fn new(status_code: u16, expectation: Expectation) -> Self {
        Self {
            status_code,
            expectation,
        }
    }

    /// Pair an expectation with its usual status code.
    pub fn expecting(expectation: Expectation) -> Self {
        Self {
            status_code: expectation.status_code(),
            expectation,
        }
    }

    /// Status first, then body. The first mismatch is returned.
    pub fn check(&self, response: &RawResponse) -> Result<(), ContractViolation> {
        if response.status != self.status_code {
            return Err(ContractViolation::Status {
                expected: self.status_code,
                actual: response.status,
                body: response.body.clone(),
            });
        }
        self.expectation.check(&response.body)
    }
}

/// One expected outcome per branch of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTests {
    pub space_aware: UpdateTest,
    pub not_space_aware: UpdateTest,
    pub doesnt_exist: UpdateTest,
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Builders for the expectations used by update scenarios.
///
/// Not-found messages depend on which space is the default, so the builder
/// is bound to a [`SpaceLayout`].
#[derive(Debug, Clone)]
pub struct Expectations {
    layout: SpaceLayout,
}

impl Expectations {
    pub fn new(layout: SpaceLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SpaceLayout {
        &self.layout
    }

    pub fn legacy_forbidden(&self, username: &str) -> Expectation {
        Expectation::LegacyForbidden {
            username: username.to_string(),
        }
    }

    /// `space` defaults to the layout's default space.
    pub fn not_found(&self, object_type: ObjectType, id: &str, space: Option<&SpaceId>) -> Expectation {
        let space = space.unwrap_or_else(|| self.layout.default_space());
        Expectation::NotFound {
            object_type,
            prefixed_id: self.layout.prefixed_id(space, id),
        }
    }

    pub fn doesnt_exist_not_found(&self, space: Option<&SpaceId>) -> Expectation {
        self.not_found(fixtures::space_aware_type(), fixtures::DOESNT_EXIST_ID, space)
    }

    pub fn space_aware_not_found(&self, space: Option<&SpaceId>) -> Expectation {
        self.not_found(fixtures::space_aware_type(), fixtures::SPACE_AWARE_ID, space)
    }

    pub fn rbac_forbidden(&self, object_type: ObjectType) -> Expectation {
        Expectation::RbacForbidden { object_type }
    }

    pub fn doesnt_exist_rbac_forbidden(&self) -> Expectation {
        self.rbac_forbidden(fixtures::space_aware_type())
    }

    pub fn space_aware_rbac_forbidden(&self) -> Expectation {
        self.rbac_forbidden(fixtures::space_aware_type())
    }

    pub fn not_space_aware_rbac_forbidden(&self) -> Expectation {
        self.rbac_forbidden(fixtures::not_space_aware_type())
    }

    pub fn space_aware_results(&self) -> Expectation {
        Expectation::Updated(ExpectedObject {
            object_type: fixtures::space_aware_type(),
            id_match: IdMatch::Suffix,
            version: fixtures::SEEDED_VERSION + 1,
            attributes: fixtures::space_aware_payload().attributes,
        })
    }

    pub fn not_space_aware_results(&self) -> Expectation {
        Expectation::Updated(ExpectedObject {
            object_type: fixtures::not_space_aware_type(),
            id_match: IdMatch::Anchored,
            version: fixtures::SEEDED_VERSION + 1,
            attributes: fixtures::not_space_aware_payload().attributes,
        })
    }
}

impl Default for Expectations {
    fn default() -> Self {
        Self::new(SpaceLayout::default())
    }
}
