//! The update contract verifier.
//!
//! A [`ContractVerifier`] is built from an injected fixture loader and
//! transport. Each scenario loads the dataset, issues its three branch
//! requests in order, and unloads the dataset on every exit path.

use savedobj_core::{FixtureLoader, SavedObjectsTransport, SpaceLayout};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

use crate::expect::{ContractViolation, Expectations};
use crate::fixtures::SPACES_DATASET;
use crate::scenario::{plan, Branch, UpdateTestDefinition};

/// Settings fixed for the lifetime of a verifier.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub layout: SpaceLayout,
    /// Dataset loaded around every scenario.
    pub dataset: String,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            layout: SpaceLayout::default(),
            dataset: SPACES_DATASET.to_string(),
        }
    }
}

// ============================================================================
// REPORTS
// ============================================================================

/// Why a branch failed.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchFailure {
    /// The response did not match the expectation.
    Violation(ContractViolation),
    /// No response was obtained.
    Transport(String),
}

impl fmt::Display for BranchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchFailure::Violation(v) => write!(f, "{}", v),
            BranchFailure::Transport(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

/// Result of one branch request.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchOutcome {
    pub branch: Branch,
    pub title: String,
    pub path: String,
    /// Status received, if a response arrived.
    pub status: Option<u16>,
    pub failure: Option<BranchFailure>,
}

impl BranchOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of one scenario group.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub description: String,
    /// Set when the dataset could not be loaded; no branch ran.
    pub setup_failure: Option<String>,
    /// Set when the dataset could not be unloaded.
    pub teardown_failure: Option<String>,
    pub branches: Vec<BranchOutcome>,
}

impl ScenarioReport {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            setup_failure: None,
            teardown_failure: None,
            branches: Vec::with_capacity(Branch::ALL.len()),
        }
    }

    pub fn passed(&self) -> bool {
        self.setup_failure.is_none()
            && self.teardown_failure.is_none()
            && self.branches.len() == Branch::ALL.len()
            && self.branches.iter().all(BranchOutcome::passed)
    }

    pub fn branch(&self, branch: Branch) -> Option<&BranchOutcome> {
        self.branches.iter().find(|outcome| outcome.branch == branch)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BranchOutcome> {
        self.branches.iter().filter(|outcome| !outcome.passed())
    }
}

// ============================================================================
// VERIFIER
// ============================================================================

/// Drives update scenarios against a saved-object API.
#[derive(Clone)]
pub struct ContractVerifier {
    fixtures: Arc<dyn FixtureLoader>,
    transport: Arc<dyn SavedObjectsTransport>,
    settings: VerifierSettings,
    expectations: Expectations,
}

impl ContractVerifier {
    pub fn new(
        fixtures: Arc<dyn FixtureLoader>,
        transport: Arc<dyn SavedObjectsTransport>,
        settings: VerifierSettings,
    ) -> Self {
        let expectations = Expectations::new(settings.layout.clone());
        Self {
            fixtures,
            transport,
            settings,
            expectations,
        }
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Expectation builders bound to this verifier's space layout.
    pub fn expectations(&self) -> &Expectations {
        &self.expectations
    }

    /// Issue one branch request and check it. Never retries.
    pub async fn run_branch(
        &self,
        definition: &UpdateTestDefinition,
        branch: Branch,
    ) -> BranchOutcome {
        let test = definition.test_for(branch);
        let request = plan(&self.settings.layout, definition, branch);
        let title = branch.describe(test.status_code);

        let response = self
            .transport
            .put_json(&request.path, definition.user.as_ref(), &request.body.to_value())
            .await;

        let (status, failure) = match response {
            Ok(response) => {
                let failure = test.check(&response).err().map(BranchFailure::Violation);
                (Some(response.status), failure)
            }
            Err(err) => (None, Some(BranchFailure::Transport(err.to_string()))),
        };

        match &failure {
            None => tracing::debug!(branch = %branch, path = %request.path, ?status, "branch passed"),
            Some(reason) => tracing::warn!(
                branch = %branch,
                path = %request.path,
                ?status,
                %reason,
                "branch failed"
            ),
        }

        BranchOutcome {
            branch,
            title,
            path: request.path,
            status,
            failure,
        }
    }

    /// Run a scenario group: load the dataset, run every branch, unload.
    ///
    /// The dataset is unloaded whether the branches pass, fail, or the load
    /// itself failed part-way.
    pub async fn update_test(
        &self,
        description: &str,
        definition: &UpdateTestDefinition,
    ) -> ScenarioReport {
        let span = tracing::info_span!(
            "update_scenario",
            description = %description,
            user = definition.user.as_ref().map(|u| u.username()).unwrap_or("<none>"),
        );

        async {
            let mut report = ScenarioReport::new(description);
            let dataset = self.settings.dataset.as_str();

            match self.fixtures.load(dataset).await {
                Ok(()) => {
                    for branch in Branch::ALL {
                        report.branches.push(self.run_branch(definition, branch).await);
                    }
                }
                Err(err) => {
                    tracing::error!(dataset, error = %err, "fixture load failed");
                    report.setup_failure = Some(err.to_string());
                }
            }

            if let Err(err) = self.fixtures.unload(dataset).await {
                tracing::error!(dataset, error = %err, "fixture unload failed");
                report.teardown_failure = Some(err.to_string());
            }

            tracing::info!(passed = report.passed(), "scenario finished");
            report
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for ContractVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractVerifier")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
