//! savedobj Test Utilities
//!
//! Shared test infrastructure for the savedobj workspace:
//! - An in-memory reference server for the saved-object update endpoint
//! - An in-process transport driving that server through `tower`
//! - Standard security personas and their expected outcomes
//! - Proptest generators and report assertions

pub mod assertions;
pub mod fixtures;
pub mod generators;
pub mod security;
pub mod server;
pub mod store;
pub mod transport;

pub use assertions::{
    assert_error_body_only, assert_only_branch_failed, assert_scenario_passed, assert_suite_passed,
};
pub use fixtures::{security_with_personas, Persona};
pub use security::{basic_auth_header, parse_basic_auth, Grant, Security, User};
pub use server::{reference_router, spawn_reference_server, ReferenceServer};
pub use store::ReferenceStore;
pub use transport::{encode_path, RouterTransport};

use savedobj_verify::{ContractVerifier, VerifierSettings};
use std::sync::Arc;

// ============================================================================
// HARNESS
// ============================================================================

/// A verifier wired to an in-process reference server.
#[derive(Debug, Clone)]
pub struct Harness {
    pub store: ReferenceStore,
    pub verifier: ContractVerifier,
}

impl Harness {
    pub fn new(security: Security) -> Self {
        Self::with_store(ReferenceStore::default(), security)
    }

    pub fn with_store(store: ReferenceStore, security: Security) -> Self {
        let transport = RouterTransport::new(reference_router(store.clone(), security));
        let settings = VerifierSettings {
            layout: store.layout().clone(),
            ..VerifierSettings::default()
        };
        let verifier = ContractVerifier::new(Arc::new(store.clone()), Arc::new(transport), settings);
        Self { store, verifier }
    }

    /// Spaces-only deployment: no authentication.
    pub fn spaces_only() -> Self {
        Self::new(Security::Disabled)
    }

    /// Security and spaces, with every [`Persona`] registered.
    pub fn security_and_spaces() -> Self {
        Self::new(security_with_personas())
    }
}
