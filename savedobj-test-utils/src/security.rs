//! Authentication and authorization of reference-server requests.
//!
//! Two authorization layers are modelled, each with its own rejection body:
//! the legacy index-privilege check and the RBAC check on saved-object
//! actions. Both run before the object is looked up, so a forbidden
//! principal learns nothing about which ids exist.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use savedobj_core::{Action, Credentials, ErrorBody, ObjectType, PermissionSet, SpaceId};

/// What a user is allowed to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Grant {
    /// Everything, everywhere.
    Superuser,
    /// Index privileges only; writes are checked by the legacy layer.
    Legacy { can_write: bool },
    /// Saved-object permissions, limited to `spaces` when given.
    Rbac {
        permissions: PermissionSet,
        spaces: Option<Vec<SpaceId>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub credentials: Credentials,
    pub grant: Grant,
}

impl User {
    pub fn new(credentials: Credentials, grant: Grant) -> Self {
        Self { credentials, grant }
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Check `action` on `object_type` in `space`.
    pub fn authorize(&self, space: &SpaceId, object_type: &ObjectType, action: Action) -> Result<(), ErrorBody> {
        match &self.grant {
            Grant::Superuser => Ok(()),
            Grant::Legacy { can_write } => {
                if *can_write || !is_write(action) {
                    Ok(())
                } else {
                    Err(ErrorBody::legacy_forbidden(self.username()))
                }
            }
            Grant::Rbac { permissions, spaces } => {
                let in_scope = spaces.as_ref().map_or(true, |spaces| spaces.contains(space));
                if in_scope && permissions.allows(object_type, action) {
                    Ok(())
                } else {
                    Err(ErrorBody::rbac_forbidden(object_type, action))
                }
            }
        }
    }
}

fn is_write(action: Action) -> bool {
    !Action::read_actions().contains(&action)
}

/// Security configuration of the reference server.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Security {
    /// Every request is allowed, with or without credentials.
    #[default]
    Disabled,
    Enabled { users: Vec<User> },
}

impl Security {
    pub fn enabled(users: impl IntoIterator<Item = User>) -> Self {
        Security::Enabled {
            users: users.into_iter().collect(),
        }
    }

    /// Resolve the `Authorization` header to a user.
    ///
    /// With security disabled the header is ignored and `None` is returned.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Option<&User>, ErrorBody> {
        let users = match self {
            Security::Disabled => return Ok(None),
            Security::Enabled { users } => users,
        };

        let (username, password) = authorization
            .and_then(parse_basic_auth)
            .ok_or_else(|| ErrorBody::unauthorized("Unauthorized"))?;

        users
            .iter()
            .find(|user| user.credentials.matches(&username, &password))
            .map(Some)
            .ok_or_else(|| ErrorBody::unauthorized("Unauthorized"))
    }

    /// Authenticate and then authorize one request.
    pub fn check(
        &self,
        authorization: Option<&str>,
        space: &SpaceId,
        object_type: &ObjectType,
        action: Action,
    ) -> Result<(), ErrorBody> {
        match self.authenticate(authorization)? {
            Some(user) => user.authorize(space, object_type, action),
            None => Ok(()),
        }
    }
}

/// Decode `Basic <base64(username:password)>`.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// `Basic` header value for `credentials`.
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.username(), credentials.expose_password());
    format!("Basic {}", STANDARD.encode(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(id: &str) -> SpaceId {
        SpaceId::new(id).expect("valid space id")
    }

    #[test]
    fn test_basic_auth_round_trip() {
        let credentials = Credentials::new("elastic", "chan:geme");
        let header = basic_auth_header(&credentials);
        assert_eq!(
            parse_basic_auth(&header),
            Some(("elastic".to_string(), "chan:geme".to_string()))
        );
        assert_eq!(parse_basic_auth("Bearer abc"), None);
        assert_eq!(parse_basic_auth("Basic !!!"), None);
    }

    #[test]
    fn test_disabled_security_ignores_credentials() {
        let security = Security::Disabled;
        assert_eq!(security.authenticate(None), Ok(None));
        assert_eq!(security.authenticate(Some("Basic garbage")), Ok(None));
    }

    #[test]
    fn test_enabled_security_requires_known_user() {
        let user = User::new(Credentials::new("elastic", "changeme"), Grant::Superuser);
        let security = Security::enabled([user.clone()]);

        assert_eq!(
            security.authenticate(None),
            Err(ErrorBody::unauthorized("Unauthorized"))
        );
        let wrong = basic_auth_header(&Credentials::new("elastic", "wrong"));
        assert!(security.authenticate(Some(&wrong)).is_err());
        let right = basic_auth_header(&user.credentials);
        assert_eq!(security.authenticate(Some(&right)), Ok(Some(&user)));
    }

    #[test]
    fn test_legacy_grant() {
        let reader = User::new(
            Credentials::new("a_kibana_legacy_dashboard_only_user", "password"),
            Grant::Legacy { can_write: false },
        );
        let visualization = ObjectType::visualization();
        assert_eq!(reader.authorize(&space("default"), &visualization, Action::Get), Ok(()));
        assert_eq!(
            reader.authorize(&space("default"), &visualization, Action::Update),
            Err(ErrorBody::legacy_forbidden("a_kibana_legacy_dashboard_only_user"))
        );
    }

    #[test]
    fn test_rbac_grant_checks_type_and_space() {
        let user = User::new(
            Credentials::new("a_kibana_rbac_space_1_all_user", "password"),
            Grant::Rbac {
                permissions: PermissionSet::new().grant(ObjectType::visualization(), Action::all()),
                spaces: Some(vec![space("space_1")]),
            },
        );

        assert_eq!(
            user.authorize(&space("space_1"), &ObjectType::visualization(), Action::Update),
            Ok(())
        );
        assert_eq!(
            user.authorize(&space("space_1"), &ObjectType::globaltype(), Action::Update),
            Err(ErrorBody::rbac_forbidden(&ObjectType::globaltype(), Action::Update))
        );
        assert_eq!(
            user.authorize(&space("default"), &ObjectType::visualization(), Action::Update),
            Err(ErrorBody::rbac_forbidden(&ObjectType::visualization(), Action::Update))
        );
    }
}
