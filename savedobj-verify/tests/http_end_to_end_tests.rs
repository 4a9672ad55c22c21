//! The verifier over real HTTP: `RestTransport` against a reference server
//! bound to a local port.

use savedobj_core::{FixtureLoader, SavedObjectsTransport, SpaceLayout};
use savedobj_test_utils::{
    assert_suite_passed, security_with_personas, spawn_reference_server, Persona, ReferenceStore,
    Security,
};
use savedobj_verify::{
    default_spaces_matrix, fixtures, suite_from_config, verifier_from_config, ContractVerifier,
    RestTransport, UpdateSuite, VerifierConfig, VerifierSettings,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_spaces_matrix_over_http() {
    let store = ReferenceStore::default();
    let server = spawn_reference_server(store.clone(), Security::Disabled)
        .await
        .expect("server starts");
    let transport = RestTransport::new(&server.base_url(), Duration::from_secs(10)).expect("transport");
    let verifier = ContractVerifier::new(Arc::new(store.clone()), Arc::new(transport), VerifierSettings::default());

    let report = default_spaces_matrix(&SpaceLayout::default())
        .expect("valid spaces")
        .run(&verifier)
        .await;

    assert_suite_passed(&report);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unknown_id_with_spaces_is_encoded_on_the_wire() {
    let store = ReferenceStore::default();
    store.load(fixtures::SPACES_DATASET).await.expect("dataset loads");
    let server = spawn_reference_server(store, Security::Disabled)
        .await
        .expect("server starts");
    let transport = RestTransport::new(&server.base_url(), Duration::from_secs(10)).expect("transport");

    let response = transport
        .put_json(
            "/s/space_1/api/saved_objects/visualization/space_1:not an id",
            None,
            &fixtures::space_aware_payload().to_value(),
        )
        .await
        .expect("response");

    assert_eq!(response.status, 404);
    assert_eq!(
        response.body["message"],
        "Saved object [visualization/space_1:not an id] not found"
    );
}

#[tokio::test]
async fn test_basic_auth_over_http() {
    let store = ReferenceStore::default();
    let server = spawn_reference_server(store.clone(), security_with_personas())
        .await
        .expect("server starts");
    let transport = RestTransport::new(&server.base_url(), Duration::from_secs(10)).expect("transport");
    let verifier = ContractVerifier::new(Arc::new(store), Arc::new(transport), VerifierSettings::default());
    let default_space = verifier.settings().layout.default_space().clone();

    let mut suite = UpdateSuite::new();
    for persona in [Persona::Superuser, Persona::RbacRead, Persona::LegacyRead] {
        suite.update_test(
            persona.username(),
            persona.definition(verifier.expectations(), &default_space),
        );
    }

    assert_suite_passed(&suite.run(&verifier).await);
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_failure() {
    // bind then drop to get a port nothing listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        listener.local_addr().expect("addr")
    };
    let store = ReferenceStore::default();
    let transport = RestTransport::new(&format!("http://{}", addr), Duration::from_secs(2)).expect("transport");
    let verifier = ContractVerifier::new(Arc::new(store.clone()), Arc::new(transport), VerifierSettings::default());

    let report = default_spaces_matrix(&SpaceLayout::default())
        .expect("valid spaces")
        .run(&verifier)
        .await;

    assert_eq!(report.failed_count(), 3);
    for scenario in &report.scenarios {
        assert!(scenario
            .branches
            .iter()
            .all(|b| matches!(b.failure, Some(savedobj_verify::BranchFailure::Transport(_)))));
    }
    assert_eq!(store.unload_count(), 3);
}

#[tokio::test]
async fn test_config_driven_run() {
    let server = spawn_reference_server(ReferenceStore::default(), security_with_personas())
        .await
        .expect("server starts");

    // noop fixtures: the store is seeded out of band and each scenario
    // only touches objects the previous ones did not
    let config = VerifierConfig::from_toml(&format!(
        r#"
        base_url = "{}"
        request_timeout_ms = 10000
        dataset = "saved_objects/spaces"

        [fixtures]
        kind = "noop"

        [[scenarios]]
        description = "rbac reader in space_1"
        space_id = "space_1"
        user = {{ username = "a_kibana_rbac_dashboard_only_user", password = "password" }}
        expect = {{ space_aware = "rbac_forbidden", not_space_aware = "rbac_forbidden", doesnt_exist = "rbac_forbidden" }}

        [[scenarios]]
        description = "legacy reader"
        user = {{ username = "a_kibana_legacy_dashboard_only_user", password = "password" }}
        expect = {{ space_aware = "legacy_forbidden", not_space_aware = "legacy_forbidden", doesnt_exist = "legacy_forbidden" }}
        "#,
        server.base_url()
    ))
    .expect("config parses");
    config.validate().expect("config is valid");

    let verifier = verifier_from_config(&config).expect("verifier builds");
    let suite = suite_from_config(&config, &verifier).expect("suite builds");

    let report = suite.run(&verifier).await;
    assert_suite_passed(&report);
    assert_eq!(report.passed_count(), 2);
}
