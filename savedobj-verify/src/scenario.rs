//! Scenario definitions and the requests each branch issues.

use savedobj_core::{Credentials, SpaceId, SpaceLayout, UpdateRequest};
use std::fmt;

use crate::expect::{UpdateTest, UpdateTests};
use crate::fixtures;

/// One update scenario: who asks, from which space, and what should happen.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTestDefinition {
    /// Basic-auth credentials; `None` sends no auth header.
    pub user: Option<Credentials>,
    /// Space the requests are made in; `None` is the default space.
    pub space_id: Option<SpaceId>,
    /// Space whose objects are targeted when it differs from `space_id`.
    pub other_space_id: Option<SpaceId>,
    pub tests: UpdateTests,
}

impl UpdateTestDefinition {
    pub fn new(tests: UpdateTests) -> Self {
        Self {
            user: None,
            space_id: None,
            other_space_id: None,
            tests,
        }
    }

    pub fn with_user(mut self, user: Credentials) -> Self {
        self.user = Some(user);
        self
    }

    pub fn in_space(mut self, space_id: SpaceId) -> Self {
        self.space_id = Some(space_id);
        self
    }

    pub fn targeting_space(mut self, other_space_id: SpaceId) -> Self {
        self.other_space_id = Some(other_space_id);
        self
    }

    /// Space the requests are made in.
    pub fn request_space<'a>(&'a self, layout: &'a SpaceLayout) -> &'a SpaceId {
        self.space_id.as_ref().unwrap_or_else(|| layout.default_space())
    }

    /// Space whose objects are targeted.
    pub fn target_space<'a>(&'a self, layout: &'a SpaceLayout) -> &'a SpaceId {
        self.other_space_id
            .as_ref()
            .unwrap_or_else(|| self.request_space(layout))
    }

    pub fn test_for(&self, branch: Branch) -> &UpdateTest {
        match branch {
            Branch::SpaceAware => &self.tests.space_aware,
            Branch::NotSpaceAware => &self.tests.not_space_aware,
            Branch::DoesntExist => &self.tests.doesnt_exist,
        }
    }
}

/// The three independent requests of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    SpaceAware,
    NotSpaceAware,
    DoesntExist,
}

impl Branch {
    pub const ALL: [Branch; 3] = [Branch::SpaceAware, Branch::NotSpaceAware, Branch::DoesntExist];

    pub fn name(&self) -> &'static str {
        match self {
            Branch::SpaceAware => "space_aware",
            Branch::NotSpaceAware => "not_space_aware",
            Branch::DoesntExist => "doesnt_exist",
        }
    }

    /// Human-readable test title for `status_code`.
    pub fn describe(&self, status_code: u16) -> String {
        match self {
            Branch::SpaceAware => format!("should return {} for a space-aware doc", status_code),
            Branch::NotSpaceAware => {
                format!("should return {} for a non space-aware doc", status_code)
            }
            Branch::DoesntExist => format!("unknown id should return {}", status_code),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path and body of a branch request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRequest {
    pub path: String,
    pub body: UpdateRequest,
}

/// Build the request a branch issues.
///
/// The space-aware branch is made in the request space but addresses the
/// target space's copy of the object through its id prefix. The non
/// space-aware object has no id prefix, so the branch is made in the target
/// space instead. The unknown id is always addressed in the request space.
pub fn plan(layout: &SpaceLayout, definition: &UpdateTestDefinition, branch: Branch) -> PlannedRequest {
    let request_space = definition.request_space(layout);
    let target_space = definition.target_space(layout);

    match branch {
        Branch::SpaceAware => PlannedRequest {
            path: format!(
                "{}/api/saved_objects/{}/{}",
                layout.url_prefix(request_space),
                fixtures::space_aware_type(),
                layout.prefixed_id(target_space, fixtures::SPACE_AWARE_ID)
            ),
            body: fixtures::space_aware_payload(),
        },
        Branch::NotSpaceAware => PlannedRequest {
            path: format!(
                "{}/api/saved_objects/{}/{}",
                layout.url_prefix(target_space),
                fixtures::not_space_aware_type(),
                fixtures::NOT_SPACE_AWARE_ID
            ),
            body: fixtures::not_space_aware_payload(),
        },
        Branch::DoesntExist => PlannedRequest {
            path: format!(
                "{}/api/saved_objects/{}/{}",
                layout.url_prefix(request_space),
                fixtures::space_aware_type(),
                layout.prefixed_id(request_space, fixtures::DOESNT_EXIST_ID)
            ),
            body: fixtures::space_aware_payload(),
        },
    }
}
