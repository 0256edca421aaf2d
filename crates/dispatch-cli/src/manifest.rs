//! TOML task manifest loading: a small `#[serde(default = ...)]`-driven
//! shape, parsed once at startup and turned into the core crate's types.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use dispatch_core::executor::{InProcessJob, Outcome};
use dispatch_core::task::{ResourceHints, RetryRule, Task, TaskId};

fn default_memory_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct ManifestToml {
    #[serde(rename = "task", default)]
    pub tasks: Vec<TaskToml>,
}

#[derive(Debug, Deserialize)]
pub struct TaskToml {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub cpus: Option<u32>,
    #[serde(default)]
    pub retry: HashMap<String, RetryRuleToml>,
}

#[derive(Debug, Deserialize)]
pub struct RetryRuleToml {
    /// Absent when the manifest doesn't set it for this kind -- falls back to
    /// `build_tasks`'s configured default rather than a fixed constant.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default = "default_memory_multiplier")]
    pub memory_multiplier: f64,
}

/// The outcome of running one manifest task's shell command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub name: String,
    pub exit_code: i32,
    pub stdout: String,
}

pub fn parse_manifest(raw: &str) -> Result<ManifestToml, toml::de::Error> {
    toml::from_str(raw)
}

/// Turns parsed manifest entries into `Task`s the `InProcessExecutor` can
/// run: each task's job shells out via `sh -c <command>` and reports a
/// `"non_zero_exit"` failure kind on a non-zero exit code (classified
/// non-retryable by the default policy, since a command's own exit status
/// is not a transient condition) or `"transient"` if the command itself
/// could not be spawned.
pub fn build_tasks(
    manifest: ManifestToml,
    default_retry_max_attempts: u32,
) -> Vec<Task<InProcessJob<CommandOutcome>>> {
    manifest
        .tasks
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let name = t.name.clone();
            let command = t.command.clone();
            let job: InProcessJob<CommandOutcome> = Arc::new(move || {
                let name = name.clone();
                let command = command.clone();
                let fut: Pin<Box<dyn Future<Output = Outcome<CommandOutcome>> + Send>> =
                    Box::pin(async move {
                        match tokio::process::Command::new("sh")
                            .arg("-c")
                            .arg(&command)
                            .output()
                            .await
                        {
                            Ok(output) => {
                                let exit_code = output.status.code().unwrap_or(-1);
                                if exit_code == 0 {
                                    Outcome::Success(CommandOutcome {
                                        name,
                                        exit_code,
                                        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                                    })
                                } else {
                                    Outcome::Failure {
                                        kind: "non_zero_exit".to_string(),
                                        detail: format!("`{command}` exited with {exit_code}"),
                                    }
                                }
                            }
                            Err(e) => Outcome::Failure {
                                kind: "transient".to_string(),
                                detail: e.to_string(),
                            },
                        }
                    });
                fut
            });

            let mut task = Task::new(TaskId(i as u64), job).with_resources(ResourceHints {
                memory: t.memory,
                cpus: t.cpus,
                placement_group: None,
            });
            for (kind, rule) in t.retry {
                let max_attempts = rule.max_attempts.unwrap_or(default_retry_max_attempts);
                task = task.with_retry_rule(kind, RetryRule::new(max_attempts, rule.memory_multiplier));
            }
            task
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tasks_with_defaulted_retry_fields() {
        let raw = r#"
            [[task]]
            name = "one"
            command = "echo hi"

            [[task]]
            name = "two"
            command = "false"
            memory = 512

            [task.retry.transient]
            max_attempts = 5
        "#;
        let manifest = parse_manifest(raw).unwrap();
        assert_eq!(manifest.tasks.len(), 2);
        assert_eq!(manifest.tasks[1].memory, Some(512));
        let rule = &manifest.tasks[1].retry["transient"];
        assert_eq!(rule.max_attempts, Some(5));
        assert_eq!(rule.memory_multiplier, 1.0);
    }

    #[test]
    fn retry_rule_missing_max_attempts_falls_back_to_configured_default() {
        let raw = r#"
            [[task]]
            name = "one"
            command = "echo hi"

            [task.retry.transient]
        "#;
        let manifest = parse_manifest(raw).unwrap();
        let tasks = build_tasks(manifest, 7);
        let rule = tasks[0].retry_table.get("transient").unwrap();
        assert_eq!(rule.max_attempts, 7);
    }

    #[tokio::test]
    async fn built_task_succeeds_for_a_zero_exit_command() {
        let manifest = parse_manifest(
            r#"
            [[task]]
            name = "ok"
            command = "true"
        "#,
        )
        .unwrap();
        let tasks = build_tasks(manifest, 3);
        assert_eq!(tasks.len(), 1);
        let outcome = (tasks[0].work)().await;
        assert!(matches!(outcome, Outcome::Success(_)));
    }
}
