//! Fixture loaders for stores the verifier does not own.

use async_trait::async_trait;
use savedobj_core::{FixtureError, FixtureLoader};
use serde::Deserialize;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Placeholder replaced by the dataset name in command arguments.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments with every `{name}` replaced by `name`.
    pub fn render_args(&self, name: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(NAME_PLACEHOLDER, name))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Load,
    Unload,
}

impl Step {
    fn error(self, name: &str, reason: String) -> FixtureError {
        match self {
            Step::Load => FixtureError::Load {
                name: name.to_string(),
                reason,
            },
            Step::Unload => FixtureError::Unload {
                name: name.to_string(),
                reason,
            },
        }
    }
}

/// Runs external commands (an archiver script, a snapshot restore) to load
/// and unload datasets. A non-zero exit is a failure.
#[derive(Debug, Clone)]
pub struct CommandFixtureLoader {
    load: CommandTemplate,
    unload: CommandTemplate,
    timeout: Duration,
}

impl CommandFixtureLoader {
    pub fn new(load: CommandTemplate, unload: CommandTemplate, timeout: Duration) -> Self {
        Self {
            load,
            unload,
            timeout,
        }
    }

    async fn run(&self, step: Step, name: &str) -> Result<(), FixtureError> {
        let template = match step {
            Step::Load => &self.load,
            Step::Unload => &self.unload,
        };

        let mut command = Command::new(&template.program);
        command
            .args(template.render_args(name))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(step.error(name, format!("failed to run '{}': {}", template.program, e)));
            }
            Err(_) => {
                return Err(step.error(
                    name,
                    format!("'{}' timed out after {}ms", template.program, self.timeout.as_millis()),
                ));
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        if output.status.success() {
            tracing::debug!(dataset = name, ?step, duration_ms, "fixture command finished");
            return Ok(());
        }

        let status = output.status.code().unwrap_or_default();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let mut reason = format!("'{}' exited with status {}", template.program, status);
        if !stderr.is_empty() {
            reason.push_str(": ");
            reason.push_str(&stderr);
        }
        Err(step.error(name, reason))
    }
}

#[async_trait]
impl FixtureLoader for CommandFixtureLoader {
    async fn load(&self, name: &str) -> Result<(), FixtureError> {
        self.run(Step::Load, name).await
    }

    async fn unload(&self, name: &str) -> Result<(), FixtureError> {
        self.run(Step::Unload, name).await
    }
}

/// For stores whose data is prepared outside the verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFixtureLoader;

#[async_trait]
impl FixtureLoader for NoopFixtureLoader {
    async fn load(&self, name: &str) -> Result<(), FixtureError> {
        tracing::debug!(dataset = name, "fixture load skipped");
        Ok(())
    }

    async fn unload(&self, name: &str) -> Result<(), FixtureError> {
        tracing::debug!(dataset = name, "fixture unload skipped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args_substitutes_name() {
        let template = CommandTemplate::new("es_archiver", ["load", "{name}", "--dir={name}/data"]);
        assert_eq!(
            template.render_args("saved_objects/spaces"),
            vec!["load", "saved_objects/spaces", "--dir=saved_objects/spaces/data"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_commands() {
        let loader = CommandFixtureLoader::new(
            CommandTemplate::new("sh", ["-c", "test \"$0\" = saved_objects/spaces", "{name}"]),
            CommandTemplate::new("true", Vec::<String>::new()),
            Duration::from_secs(10),
        );
        assert_eq!(loader.load("saved_objects/spaces").await, Ok(()));
        assert_eq!(loader.unload("saved_objects/spaces").await, Ok(()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_reported_with_stderr() {
        let loader = CommandFixtureLoader::new(
            CommandTemplate::new("sh", ["-c", "echo archive missing >&2; exit 3"]),
            CommandTemplate::new("sh", ["-c", "exit 1"]),
            Duration::from_secs(10),
        );

        match loader.load("saved_objects/spaces").await {
            Err(FixtureError::Load { name, reason }) => {
                assert_eq!(name, "saved_objects/spaces");
                assert!(reason.contains("status 3"), "reason: {}", reason);
                assert!(reason.contains("archive missing"), "reason: {}", reason);
            }
            other => panic!("expected load failure, got {:?}", other),
        }
        assert!(matches!(
            loader.unload("saved_objects/spaces").await,
            Err(FixtureError::Unload { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let loader = CommandFixtureLoader::new(
            CommandTemplate::new("sleep", ["5"]),
            CommandTemplate::new("true", Vec::<String>::new()),
            Duration::from_millis(100),
        );
        match loader.load("saved_objects/spaces").await {
            Err(FixtureError::Load { reason, .. }) => assert!(reason.contains("timed out")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let loader = CommandFixtureLoader::new(
            CommandTemplate::new("definitely-not-a-fixture-tool", Vec::<String>::new()),
            CommandTemplate::new("definitely-not-a-fixture-tool", Vec::<String>::new()),
            Duration::from_secs(1),
        );
        assert!(matches!(
            loader.load("saved_objects/spaces").await,
            Err(FixtureError::Load { .. })
        ));
    }

    #[tokio::test]
    async fn test_noop_loader() {
        assert_eq!(NoopFixtureLoader.load("anything").await, Ok(()));
        assert_eq!(NoopFixtureLoader.unload("anything").await, Ok(()));
    }
}
