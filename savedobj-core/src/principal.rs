//! Principals: credentials plus the permissions their roles grant.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::object::ObjectType;

/// Basic-auth credentials. The password never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Self {
            username: username.into(),
            password: SecretString::new(password.into_boxed_str()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Expose the password (only for building the auth header).
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Compare against credentials presented by a client.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.expose_secret() == password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl Eq for Credentials {}

impl<'de> Deserialize<'de> for Credentials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            username: String,
            password: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Credentials::new(raw.username, raw.password))
    }
}

/// Saved-object operations that can be authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Get,
    BulkGet,
    Find,
    Create,
    BulkCreate,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::BulkGet => "bulk_get",
            Action::Find => "find",
            Action::Create => "create",
            Action::BulkCreate => "bulk_create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Actions granted by a read-only role.
    pub fn read_actions() -> &'static [Action] {
        &[Action::Get, Action::BulkGet, Action::Find]
    }

    /// Every action.
    pub fn all() -> &'static [Action] {
        &[
            Action::Get,
            Action::BulkGet,
            Action::Find,
            Action::Create,
            Action::BulkCreate,
            Action::Update,
            Action::Delete,
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAction(s.to_string()))
    }
}

/// Permission to perform `action` on objects of `object_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    pub object_type: ObjectType,
    pub action: Action,
}

impl Permission {
    pub fn new(object_type: ObjectType, action: Action) -> Self {
        Self { object_type, action }
    }

    /// Action name as checked by the authorization layer, e.g.
    /// `action:saved_objects/visualization/update`.
    pub fn action_name(&self) -> String {
        format!("action:saved_objects/{}/{}", self.object_type, self.action)
    }
}

/// Set of permissions derived from a principal's roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, object_type: ObjectType, actions: &[Action]) -> Self {
        for action in actions {
            self.0.insert(Permission::new(object_type.clone(), *action));
        }
        self
    }

    pub fn allows(&self, object_type: &ObjectType, action: Action) -> bool {
        self.0
            .iter()
            .any(|p| p.object_type == *object_type && p.action == action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("elastic", "changeme");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("elastic"));
        assert!(!debug.contains("changeme"));
        assert!(creds.matches("elastic", "changeme"));
        assert!(!creds.matches("elastic", "wrong"));
    }

    #[test]
    fn test_credentials_deserialize() -> Result<(), serde_json::Error> {
        let creds: Credentials =
            serde_json::from_str(r#"{"username":"a_kibana_rbac_user","password":"pw"}"#)?;
        assert_eq!(creds.username(), "a_kibana_rbac_user");
        assert_eq!(creds.expose_password(), "pw");
        Ok(())
    }

    #[test]
    fn test_action_round_trip_names() {
        for action in Action::all() {
            assert_eq!(action.as_str().parse::<Action>(), Ok(*action));
        }
        assert!("explode".parse::<Action>().is_err());
    }

    #[test]
    fn test_permission_action_name() {
        let permission = Permission::new(ObjectType::globaltype(), Action::Update);
        assert_eq!(
            permission.action_name(),
            "action:saved_objects/globaltype/update"
        );
    }

    #[test]
    fn test_permission_set_allows() {
        let set = PermissionSet::new()
            .grant(ObjectType::visualization(), Action::read_actions())
            .grant(ObjectType::globaltype(), Action::all());

        assert!(set.allows(&ObjectType::visualization(), Action::Get));
        assert!(!set.allows(&ObjectType::visualization(), Action::Update));
        assert!(set.allows(&ObjectType::globaltype(), Action::Update));
        assert!(!PermissionSet::new().allows(&ObjectType::globaltype(), Action::Get));
    }
}
