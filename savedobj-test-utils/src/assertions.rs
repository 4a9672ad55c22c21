//! Assertions over verifier reports and raw responses.

use savedobj_core::{ErrorBody, RawResponse};
use savedobj_verify::{Branch, ScenarioReport, SuiteReport};

/// Panic with every failing branch when the scenario did not pass.
pub fn assert_scenario_passed(report: &ScenarioReport) {
    if report.passed() {
        return;
    }
    let mut lines = vec![format!("scenario '{}' failed", report.description)];
    if let Some(reason) = &report.setup_failure {
        lines.push(format!("  setup: {}", reason));
    }
    if let Some(reason) = &report.teardown_failure {
        lines.push(format!("  teardown: {}", reason));
    }
    for outcome in report.failures() {
        if let Some(failure) = &outcome.failure {
            lines.push(format!("  {} ({}): {}", outcome.title, outcome.path, failure));
        }
    }
    panic!("{}", lines.join("\n"));
}

pub fn assert_suite_passed(report: &SuiteReport) {
    for scenario in &report.scenarios {
        assert_scenario_passed(scenario);
    }
}

/// Assert that exactly `branch` failed in the scenario.
pub fn assert_only_branch_failed(report: &ScenarioReport, branch: Branch) {
    let failed: Vec<Branch> = report.failures().map(|outcome| outcome.branch).collect();
    assert_eq!(failed, vec![branch], "unexpected failures in {:?}", report);
}

/// Assert the response is a rejection whose body is exactly an error body,
/// so no object fields leak.
pub fn assert_error_body_only(response: &RawResponse) -> ErrorBody {
    let body: ErrorBody = match serde_json::from_value(response.body.clone()) {
        Ok(body) => body,
        Err(e) => panic!("response is not a bare error body ({}): {}", e, response.body),
    };
    assert_eq!(body.status_code, response.status, "status mismatch: {}", response.body);
    assert!(response.body.get("attributes").is_none());
    assert!(response.body.get("version").is_none());
    body
}
