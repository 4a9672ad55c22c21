//! Error bodies returned by the saved-object API.
//!
//! Every rejection is serialized as `{statusCode, error, message}`. The
//! message text is part of the contract: clients tell the two forbidden
//! variants apart by it, and not-found messages name the space-prefixed id.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::object::ObjectType;
use crate::principal::{Action, Permission};

/// Index-level privilege checked by the legacy security layer for updates.
pub const LEGACY_UPDATE_PRIVILEGE: &str = "indices:data/write/update";

// ============================================================================
// ERROR KIND
// ============================================================================

/// HTTP error class of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
        }
    }

    /// Reason phrase placed in the `error` field.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
        }
    }
}

// ============================================================================
// ERROR BODY
// ============================================================================

/// JSON body of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status_code: kind.status_code(),
            error: kind.reason_phrase().to_string(),
            message: message.into(),
        }
    }

    /// Rejection by the legacy index-privilege layer.
    pub fn legacy_forbidden(username: &str) -> Self {
        let reason = format!(
            "action [{}] is unauthorized for user [{}]",
            LEGACY_UPDATE_PRIVILEGE, username
        );
        Self::new(
            ErrorKind::Forbidden,
            format!("{}: [security_exception] {}", reason, reason),
        )
    }

    /// Rejection by the RBAC layer for a missing `(type, action)` permission.
    pub fn rbac_forbidden(object_type: &ObjectType, action: Action) -> Self {
        let permission = Permission::new(object_type.clone(), action);
        Self::new(
            ErrorKind::Forbidden,
            format!(
                "Unable to {} {}, missing {}",
                action,
                object_type,
                permission.action_name()
            ),
        )
    }

    /// Missing object. `prefixed_id` is the id as addressed, including any
    /// space prefix.
    pub fn not_found(object_type: &ObjectType, prefixed_id: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("Saved object [{}/{}] not found", object_type, prefixed_id),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Classify the rejection by status and message shape.
    pub fn rejection(&self) -> Rejection {
        match self.status_code {
            403 if self.message.contains("[security_exception]") => Rejection::LegacyForbidden,
            403 if self.message.starts_with("Unable to ") => Rejection::RbacForbidden,
            404 => Rejection::NotFound,
            _ => Rejection::Other,
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status_code, self.error, self.message)
    }
}

/// Which layer rejected a request, as observed at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    LegacyForbidden,
    RbacForbidden,
    NotFound,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_forbidden_message() {
        let body = ErrorBody::legacy_forbidden("a_kibana_legacy_user");
        assert_eq!(body.status_code, 403);
        assert_eq!(body.error, "Forbidden");
        assert_eq!(
            body.message,
            "action [indices:data/write/update] is unauthorized for user [a_kibana_legacy_user]: \
             [security_exception] action [indices:data/write/update] is unauthorized for user \
             [a_kibana_legacy_user]"
        );
        assert_eq!(body.rejection(), Rejection::LegacyForbidden);
    }

    #[test]
    fn test_rbac_forbidden_message() {
        let body = ErrorBody::rbac_forbidden(&ObjectType::globaltype(), Action::Update);
        assert_eq!(
            body.message,
            "Unable to update globaltype, missing action:saved_objects/globaltype/update"
        );
        assert_eq!(body.rejection(), Rejection::RbacForbidden);
    }

    #[test]
    fn test_not_found_message() {
        let body = ErrorBody::not_found(&ObjectType::visualization(), "space_1:not an id");
        assert_eq!(body.status_code, 404);
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Saved object [visualization/space_1:not an id] not found");
        assert_eq!(body.rejection(), Rejection::NotFound);
    }

    #[test]
    fn test_wire_format() -> Result<(), serde_json::Error> {
        let body = ErrorBody::not_found(&ObjectType::visualization(), "x");
        assert_eq!(
            serde_json::to_value(&body)?,
            json!({
                "statusCode": 404,
                "error": "Not Found",
                "message": "Saved object [visualization/x] not found"
            })
        );
        Ok(())
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let value = json!({
            "statusCode": 403,
            "error": "Forbidden",
            "message": "nope",
            "attributes": {}
        });
        assert!(serde_json::from_value::<ErrorBody>(value).is_err());
    }
}
