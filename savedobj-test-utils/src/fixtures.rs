//! Standard users of a security-enabled deployment and what each of them
//! should see when updating the seeded objects.

use savedobj_core::{Action, Credentials, ObjectType, PermissionSet, SpaceId};
use savedobj_verify::{Expectations, UpdateTest, UpdateTestDefinition, UpdateTests};

use crate::security::{Grant, Security, User};

/// Kinds of principal exercised by the security scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    /// An Elasticsearch user with no Kibana privileges at all.
    NotAKibanaUser,
    Superuser,
    LegacyAll,
    LegacyRead,
    RbacAll,
    RbacRead,
    /// All privileges, but only in `space_1`.
    RbacSpace1All,
}

impl Persona {
    pub const ALL: [Persona; 7] = [
        Persona::NotAKibanaUser,
        Persona::Superuser,
        Persona::LegacyAll,
        Persona::LegacyRead,
        Persona::RbacAll,
        Persona::RbacRead,
        Persona::RbacSpace1All,
    ];

    pub fn username(&self) -> &'static str {
        match self {
            Persona::NotAKibanaUser => "not_a_kibana_user",
            Persona::Superuser => "elastic",
            Persona::LegacyAll => "a_kibana_legacy_user",
            Persona::LegacyRead => "a_kibana_legacy_dashboard_only_user",
            Persona::RbacAll => "a_kibana_rbac_user",
            Persona::RbacRead => "a_kibana_rbac_dashboard_only_user",
            Persona::RbacSpace1All => "a_kibana_rbac_space_1_all_user",
        }
    }

    pub fn credentials(&self) -> Credentials {
        let password = match self {
            Persona::Superuser => "changeme",
            _ => "password",
        };
        Credentials::new(self.username(), password)
    }

    pub fn grant(&self) -> Grant {
        let all_types = [ObjectType::visualization(), ObjectType::globaltype()];
        let permissions = |actions: &[Action]| {
            all_types
                .iter()
                .cloned()
                .fold(PermissionSet::new(), |set, object_type| set.grant(object_type, actions))
        };

        match self {
            Persona::NotAKibanaUser | Persona::LegacyRead => Grant::Legacy { can_write: false },
            Persona::Superuser => Grant::Superuser,
            Persona::LegacyAll => Grant::Legacy { can_write: true },
            Persona::RbacAll => Grant::Rbac {
                permissions: permissions(Action::all()),
                spaces: None,
            },
            Persona::RbacRead => Grant::Rbac {
                permissions: permissions(Action::read_actions()),
                spaces: None,
            },
            Persona::RbacSpace1All => Grant::Rbac {
                permissions: permissions(Action::all()),
                spaces: SpaceId::new(savedobj_verify::fixtures::SPACE_1).ok().map(|s| vec![s]),
            },
        }
    }

    pub fn user(&self) -> User {
        User::new(self.credentials(), self.grant())
    }

    /// Expected outcome of each branch when this persona updates objects of
    /// `space` from inside `space`.
    pub fn expected_tests(&self, expectations: &Expectations, space: &SpaceId) -> UpdateTests {
        let allowed = match self {
            Persona::Superuser | Persona::LegacyAll | Persona::RbacAll => true,
            Persona::RbacSpace1All => space.as_str() == savedobj_verify::fixtures::SPACE_1,
            Persona::NotAKibanaUser | Persona::LegacyRead | Persona::RbacRead => false,
        };

        if allowed {
            return UpdateTests {
                space_aware: UpdateTest::expecting(expectations.space_aware_results()),
                not_space_aware: UpdateTest::expecting(expectations.not_space_aware_results()),
                doesnt_exist: UpdateTest::expecting(expectations.doesnt_exist_not_found(Some(space))),
            };
        }

        match self.grant() {
            Grant::Legacy { .. } => {
                let forbidden = expectations.legacy_forbidden(self.username());
                UpdateTests {
                    space_aware: UpdateTest::expecting(forbidden.clone()),
                    not_space_aware: UpdateTest::expecting(forbidden.clone()),
                    doesnt_exist: UpdateTest::expecting(forbidden),
                }
            }
            _ => UpdateTests {
                space_aware: UpdateTest::expecting(expectations.space_aware_rbac_forbidden()),
                not_space_aware: UpdateTest::expecting(expectations.not_space_aware_rbac_forbidden()),
                doesnt_exist: UpdateTest::expecting(expectations.doesnt_exist_rbac_forbidden()),
            },
        }
    }

    /// Scenario for this persona working in `space`.
    pub fn definition(&self, expectations: &Expectations, space: &SpaceId) -> UpdateTestDefinition {
        UpdateTestDefinition::new(self.expected_tests(expectations, space))
            .with_user(self.credentials())
            .in_space(space.clone())
    }
}

/// Security configuration knowing every [`Persona`].
pub fn security_with_personas() -> Security {
    Security::enabled(Persona::ALL.iter().map(Persona::user))
}
