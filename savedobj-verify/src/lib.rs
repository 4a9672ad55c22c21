//! savedobj verify - contract verifier for the saved-object update endpoint
//!
//! Drives update scenarios against a space-partitioned saved-object API and
//! checks every response (status, body, ids, timestamps, versions) against a
//! typed expectation. Fixture datasets are loaded and unloaded around each
//! scenario group through an injected [`FixtureLoader`], and requests go
//! through an injected [`SavedObjectsTransport`].

pub mod catalog;
pub mod command_fixtures;
pub mod config;
pub mod error;
pub mod expect;
pub mod fixtures;
pub mod scenario;
pub mod suite;
pub mod telemetry;
pub mod transport;
pub mod verifier;

use savedobj_core::{FixtureLoader, SavedObjectsTransport};
use std::sync::Arc;
use std::time::Duration;

// Re-export commonly used types
pub use catalog::{build_suite, default_spaces_matrix, BranchOutcomes, Outcome, ScenarioSpec};
pub use command_fixtures::{CommandFixtureLoader, CommandTemplate, NoopFixtureLoader};
pub use config::{ConfigError, FixtureConfig, VerifierConfig};
pub use error::{VerifyError, VerifyResult};
pub use expect::{
    ContractViolation, Expectation, ExpectedObject, Expectations, IdMatch, UpdateTest,
    UpdateTests,
};
pub use scenario::{plan, Branch, PlannedRequest, UpdateTestDefinition};
pub use suite::{SuiteReport, UpdateSuite};
pub use transport::RestTransport;
pub use verifier::{BranchFailure, BranchOutcome, ContractVerifier, ScenarioReport, VerifierSettings};

/// Build a verifier talking HTTP to `config.base_url`.
pub fn verifier_from_config(config: &VerifierConfig) -> VerifyResult<ContractVerifier> {
    let transport: Arc<dyn SavedObjectsTransport> =
        Arc::new(RestTransport::new(&config.base_url, config.request_timeout())?);

    let fixtures: Arc<dyn FixtureLoader> = match &config.fixtures {
        FixtureConfig::Noop => Arc::new(NoopFixtureLoader),
        FixtureConfig::Command {
            load,
            unload,
            timeout_ms,
        } => Arc::new(CommandFixtureLoader::new(
            load.clone(),
            unload.clone(),
            Duration::from_millis(*timeout_ms),
        )),
    };

    let settings = VerifierSettings {
        layout: config.layout(),
        dataset: config.dataset.clone(),
    };
    Ok(ContractVerifier::new(fixtures, transport, settings))
}

/// The configured scenarios, or the spaces-only matrix when none are listed.
pub fn suite_from_config(config: &VerifierConfig, verifier: &ContractVerifier) -> VerifyResult<UpdateSuite> {
    if config.scenarios.is_empty() {
        return Ok(default_spaces_matrix(&verifier.settings().layout)?);
    }
    build_suite(&config.scenarios, verifier.expectations())
}
