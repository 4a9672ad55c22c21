//! Declarative scenario catalog.
//!
//! Scenarios can be listed in the verifier config instead of being written
//! in code:
//!
//! ```toml
//! [[scenarios]]
//! description = "rbac user with read access in space_1"
//! space_id = "space_1"
//! user = { username = "a_space_1_read_user", password = "changeme" }
//! expect = { space_aware = "rbac_forbidden", not_space_aware = "rbac_forbidden", doesnt_exist = "rbac_forbidden" }
//! ```

use savedobj_core::{CoreError, Credentials, SpaceId, SpaceLayout};
use serde::Deserialize;

use crate::error::{VerifyError, VerifyResult};
use crate::expect::{Expectation, Expectations, UpdateTest, UpdateTests};
use crate::fixtures;
use crate::scenario::{Branch, UpdateTestDefinition};
use crate::suite::UpdateSuite;

/// Expected outcome of one branch, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    NotFound,
    RbacForbidden,
    LegacyForbidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchOutcomes {
    pub space_aware: Outcome,
    pub not_space_aware: Outcome,
    pub doesnt_exist: Outcome,
}

/// One scenario entry of the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    pub description: String,
    /// Run only focused scenarios when any is focused.
    #[serde(default)]
    pub only: bool,
    pub user: Option<Credentials>,
    pub space_id: Option<SpaceId>,
    pub other_space_id: Option<SpaceId>,
    pub expect: BranchOutcomes,
}

impl ScenarioSpec {
    /// Resolve the named outcomes into a scenario definition.
    pub fn to_definition(&self, expectations: &Expectations) -> VerifyResult<UpdateTestDefinition> {
        let mut definition = UpdateTestDefinition::new(UpdateTests {
            space_aware: UpdateTest::expecting(expectations.space_aware_results()),
            not_space_aware: UpdateTest::expecting(expectations.not_space_aware_results()),
            doesnt_exist: UpdateTest::expecting(expectations.doesnt_exist_not_found(None)),
        });
        definition.user = self.user.clone();
        definition.space_id = self.space_id.clone();
        definition.other_space_id = self.other_space_id.clone();

        definition.tests = UpdateTests {
            space_aware: self.resolve(expectations, &definition, Branch::SpaceAware)?,
            not_space_aware: self.resolve(expectations, &definition, Branch::NotSpaceAware)?,
            doesnt_exist: self.resolve(expectations, &definition, Branch::DoesntExist)?,
        };
        Ok(definition)
    }

    fn resolve(
        &self,
        expectations: &Expectations,
        definition: &UpdateTestDefinition,
        branch: Branch,
    ) -> VerifyResult<UpdateTest> {
        let layout = expectations.layout();
        let outcome = match branch {
            Branch::SpaceAware => self.expect.space_aware,
            Branch::NotSpaceAware => self.expect.not_space_aware,
            Branch::DoesntExist => self.expect.doesnt_exist,
        };

        let expectation = match (outcome, branch) {
            (Outcome::Success, Branch::SpaceAware) => expectations.space_aware_results(),
            (Outcome::Success, Branch::NotSpaceAware) => expectations.not_space_aware_results(),
            (Outcome::Success, Branch::DoesntExist) => {
                return Err(self.invalid("an unknown id cannot be updated successfully"));
            }
            (Outcome::NotFound, Branch::SpaceAware) => {
                expectations.space_aware_not_found(Some(definition.target_space(layout)))
            }
            // globaltype ids carry no space prefix
            (Outcome::NotFound, Branch::NotSpaceAware) => Expectation::NotFound {
                object_type: fixtures::not_space_aware_type(),
                prefixed_id: fixtures::NOT_SPACE_AWARE_ID.to_string(),
            },
            (Outcome::NotFound, Branch::DoesntExist) => {
                expectations.doesnt_exist_not_found(Some(definition.request_space(layout)))
            }
            (Outcome::RbacForbidden, Branch::SpaceAware) => expectations.space_aware_rbac_forbidden(),
            (Outcome::RbacForbidden, Branch::NotSpaceAware) => {
                expectations.not_space_aware_rbac_forbidden()
            }
            (Outcome::RbacForbidden, Branch::DoesntExist) => {
                expectations.doesnt_exist_rbac_forbidden()
            }
            (Outcome::LegacyForbidden, _) => match &self.user {
                Some(user) => expectations.legacy_forbidden(user.username()),
                None => return Err(self.invalid("legacy_forbidden needs a user")),
            },
        };
        Ok(UpdateTest::expecting(expectation))
    }

    fn invalid(&self, reason: &str) -> VerifyError {
        VerifyError::Scenario {
            scenario: self.description.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Build a suite from catalog entries, keeping their order.
pub fn build_suite(specs: &[ScenarioSpec], expectations: &Expectations) -> VerifyResult<UpdateSuite> {
    let mut suite = UpdateSuite::new();
    for spec in specs {
        let definition = spec.to_definition(expectations)?;
        if spec.only {
            suite.update_test_only(spec.description.clone(), definition);
        } else {
            suite.update_test(spec.description.clone(), definition);
        }
    }
    Ok(suite)
}

/// The spaces-only matrix: unauthenticated updates in the default space, in
/// `space_1`, and from `space_1` against `space_2` objects.
pub fn default_spaces_matrix(layout: &SpaceLayout) -> Result<UpdateSuite, CoreError> {
    let expectations = Expectations::new(layout.clone());
    let space_1 = SpaceId::new(fixtures::SPACE_1)?;
    let space_2 = SpaceId::new(fixtures::SPACE_2)?;

    let mut suite = UpdateSuite::new();
    suite
        .update_test(
            "in the default space",
            UpdateTestDefinition::new(UpdateTests {
                space_aware: UpdateTest::expecting(expectations.space_aware_results()),
                not_space_aware: UpdateTest::expecting(expectations.not_space_aware_results()),
                doesnt_exist: UpdateTest::expecting(expectations.doesnt_exist_not_found(None)),
            }),
        )
        .update_test(
            "in the current space (space_1)",
            UpdateTestDefinition::new(UpdateTests {
                space_aware: UpdateTest::expecting(expectations.space_aware_results()),
                not_space_aware: UpdateTest::expecting(expectations.not_space_aware_results()),
                doesnt_exist: UpdateTest::expecting(
                    expectations.doesnt_exist_not_found(Some(&space_1)),
                ),
            })
            .in_space(space_1.clone()),
        )
        .update_test(
            "in another space (space_2)",
            UpdateTestDefinition::new(UpdateTests {
                space_aware: UpdateTest::expecting(expectations.space_aware_not_found(Some(&space_2))),
                not_space_aware: UpdateTest::expecting(expectations.not_space_aware_results()),
                doesnt_exist: UpdateTest::expecting(
                    expectations.doesnt_exist_not_found(Some(&space_1)),
                ),
            })
            .in_space(space_1)
            .targeting_space(space_2),
        );
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Catalog {
        scenarios: Vec<ScenarioSpec>,
    }

    fn parse(toml_str: &str) -> Vec<ScenarioSpec> {
        toml::from_str::<Catalog>(toml_str)
            .expect("catalog parses")
            .scenarios
    }

    #[test]
    fn test_outcomes_resolve_against_spaces() {
        let specs = parse(
            r#"
            [[scenarios]]
            description = "cross space"
            space_id = "space_1"
            other_space_id = "space_2"
            expect = { space_aware = "not_found", not_space_aware = "success", doesnt_exist = "not_found" }
            "#,
        );
        let definition = specs[0]
            .to_definition(&Expectations::default())
            .expect("valid scenario");

        assert_eq!(
            definition.tests.space_aware.expectation,
            Expectation::NotFound {
                object_type: fixtures::space_aware_type(),
                prefixed_id: format!("space_2:{}", fixtures::SPACE_AWARE_ID),
            }
        );
        assert_eq!(
            definition.tests.doesnt_exist.expectation,
            Expectation::NotFound {
                object_type: fixtures::space_aware_type(),
                prefixed_id: "space_1:not an id".to_string(),
            }
        );
        assert_eq!(definition.tests.not_space_aware.status_code, 200);
        assert!(definition.user.is_none());
    }

    #[test]
    fn test_legacy_forbidden_uses_scenario_user() {
        let specs = parse(
            r#"
            [[scenarios]]
            description = "legacy user without write"
            user = { username = "a_kibana_legacy_dashboard_only_user", password = "pw" }
            expect = { space_aware = "legacy_forbidden", not_space_aware = "legacy_forbidden", doesnt_exist = "legacy_forbidden" }
            "#,
        );
        let definition = specs[0]
            .to_definition(&Expectations::default())
            .expect("valid scenario");
        assert_eq!(
            definition.tests.doesnt_exist.expectation,
            Expectation::LegacyForbidden {
                username: "a_kibana_legacy_dashboard_only_user".to_string()
            }
        );
        assert_eq!(definition.tests.doesnt_exist.status_code, 403);
    }

    #[test]
    fn test_legacy_forbidden_without_user_is_rejected() {
        let specs = parse(
            r#"
            [[scenarios]]
            description = "nobody"
            expect = { space_aware = "legacy_forbidden", not_space_aware = "success", doesnt_exist = "not_found" }
            "#,
        );
        let err = specs[0]
            .to_definition(&Expectations::default())
            .expect_err("legacy outcome without user");
        assert!(matches!(err, VerifyError::Scenario { .. }));
    }

    #[test]
    fn test_unknown_id_cannot_succeed() {
        let specs = parse(
            r#"
            [[scenarios]]
            description = "bogus"
            expect = { space_aware = "success", not_space_aware = "success", doesnt_exist = "success" }
            "#,
        );
        assert!(specs[0].to_definition(&Expectations::default()).is_err());
    }

    #[test]
    fn test_unknown_outcome_fails_to_parse() {
        let result = toml::from_str::<Catalog>(
            r#"
            [[scenarios]]
            description = "typo"
            expect = { space_aware = "sucess", not_space_aware = "success", doesnt_exist = "not_found" }
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_suite_honors_only() {
        let specs = parse(
            r#"
            [[scenarios]]
            description = "first"
            expect = { space_aware = "success", not_space_aware = "success", doesnt_exist = "not_found" }

            [[scenarios]]
            description = "second"
            only = true
            expect = { space_aware = "success", not_space_aware = "success", doesnt_exist = "not_found" }
            "#,
        );
        let suite = build_suite(&specs, &Expectations::default()).expect("valid catalog");
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.selected(), vec!["second"]);
    }

    #[test]
    fn test_default_spaces_matrix() {
        let suite = default_spaces_matrix(&SpaceLayout::default()).expect("valid spaces");
        assert_eq!(
            suite.selected(),
            vec![
                "in the default space",
                "in the current space (space_1)",
                "in another space (space_2)",
            ]
        );
    }
}
