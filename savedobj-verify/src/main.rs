//! savedobj-verify entry point
//!
//! Loads the TOML config, runs the configured update scenarios against the
//! target API and exits non-zero when any scenario fails.

use std::process::ExitCode;

use savedobj_verify::telemetry::{init_tracing, TelemetryConfig};
use savedobj_verify::{suite_from_config, verifier_from_config, VerifierConfig, VerifyResult};

#[tokio::main]
async fn main() -> VerifyResult<ExitCode> {
    init_tracing(&TelemetryConfig::default())?;

    let config = VerifierConfig::load()?;
    let verifier = verifier_from_config(&config)?;
    let suite = suite_from_config(&config, &verifier)?;

    tracing::info!(
        base_url = %config.base_url,
        scenarios = suite.selected().len(),
        "Starting update contract run"
    );

    let report = suite.run(&verifier).await;

    for scenario in &report.scenarios {
        if let Some(reason) = &scenario.setup_failure {
            tracing::error!(scenario = %scenario.description, %reason, "setup failed");
        }
        if let Some(reason) = &scenario.teardown_failure {
            tracing::error!(scenario = %scenario.description, %reason, "teardown failed");
        }
        for outcome in scenario.failures() {
            if let Some(failure) = &outcome.failure {
                tracing::error!(
                    scenario = %scenario.description,
                    test = %outcome.title,
                    path = %outcome.path,
                    %failure,
                    "FAILED"
                );
            }
        }
    }

    tracing::info!(
        passed = report.passed_count(),
        failed = report.failed_count(),
        skipped = report.skipped,
        "Update contract run finished"
    );

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
