//! Ordered collections of update scenarios.

use crate::scenario::UpdateTestDefinition;
use crate::verifier::{ContractVerifier, ScenarioReport};

#[derive(Debug, Clone)]
struct SuiteEntry {
    description: String,
    definition: UpdateTestDefinition,
    focused: bool,
}

/// Scenarios registered with [`update_test`](Self::update_test) run in
/// registration order. Registering any scenario with
/// [`update_test_only`](Self::update_test_only) restricts a run to the
/// focused scenarios.
#[derive(Debug, Clone, Default)]
pub struct UpdateSuite {
    entries: Vec<SuiteEntry>,
}

impl UpdateSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_test(&mut self, description: impl Into<String>, definition: UpdateTestDefinition) -> &mut Self {
        self.push(description.into(), definition, false)
    }

    pub fn update_test_only(
        &mut self,
        description: impl Into<String>,
        definition: UpdateTestDefinition,
    ) -> &mut Self {
        self.push(description.into(), definition, true)
    }

    fn push(&mut self, description: String, definition: UpdateTestDefinition, focused: bool) -> &mut Self {
        self.entries.push(SuiteEntry {
            description,
            definition,
            focused,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptions of the scenarios a run would execute, in order.
    pub fn selected(&self) -> Vec<&str> {
        self.selected_entries()
            .map(|entry| entry.description.as_str())
            .collect()
    }

    fn selected_entries(&self) -> impl Iterator<Item = &SuiteEntry> {
        let any_focused = self.entries.iter().any(|entry| entry.focused);
        self.entries
            .iter()
            .filter(move |entry| !any_focused || entry.focused)
    }

    /// Run the selected scenarios one group at a time.
    pub async fn run(&self, verifier: &ContractVerifier) -> SuiteReport {
        let mut scenarios = Vec::new();
        for entry in self.selected_entries() {
            scenarios.push(verifier.update_test(&entry.description, &entry.definition).await);
        }
        let skipped = self.entries.len() - scenarios.len();
        tracing::info!(
            ran = scenarios.len(),
            skipped,
            failed = scenarios.iter().filter(|s| !s.passed()).count(),
            "update suite finished"
        );
        SuiteReport { scenarios, skipped }
    }
}

/// Outcome of a suite run.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteReport {
    pub scenarios: Vec<ScenarioReport>,
    /// Scenarios left out because others were focused.
    pub skipped: usize,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::passed)
    }

    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.passed_count()
    }

    pub fn scenario(&self, description: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.description == description)
    }
}
