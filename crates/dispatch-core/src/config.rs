//! Layered configuration for the defaults a run starts from: built-in
//! defaults, overridden by a `dispatch.toml` file, overridden by
//! `DISPATCH_*` environment variables, overridden by explicit CLI flags.
//! Each layer only overrides the keys it actually sets.
use std::time::Duration;

use serde::Deserialize;

/// The tunables a run can be configured with, independent of the scaler,
/// retry policy, or straggler detector implementations chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchDefaults {
    pub aimd_initial: usize,
    pub aimd_max: usize,
    pub aimd_min: usize,
    pub aimd_additive_increase: usize,
    pub aimd_multiplicative_decrease: f64,
    pub retry_max_attempts: u32,
    pub submit_jitter: Duration,
}

impl Default for DispatchDefaults {
    fn default() -> Self {
        Self {
            aimd_initial: 50,
            aimd_max: 100,
            aimd_min: 10,
            aimd_additive_increase: 2,
            aimd_multiplicative_decrease: 0.5,
            retry_max_attempts: 3,
            submit_jitter: Duration::from_millis(5),
        }
    }
}

/// The subset of [`DispatchDefaults`] a `dispatch.toml` file may override.
/// Every field is optional so a file can override only what it cares
/// about.
#[derive(Debug, Default, Deserialize)]
pub struct DispatchFileConfig {
    pub aimd_initial: Option<usize>,
    pub aimd_max: Option<usize>,
    pub aimd_min: Option<usize>,
    pub aimd_additive_increase: Option<usize>,
    pub aimd_multiplicative_decrease: Option<f64>,
    pub retry_max_attempts: Option<u32>,
    pub submit_jitter_ms: Option<u64>,
}

impl DispatchDefaults {
    /// Applies a parsed file layer on top of `self`.
    pub fn merge_file(mut self, file: &DispatchFileConfig) -> Self {
        if let Some(v) = file.aimd_initial {
            self.aimd_initial = v;
        }
        if let Some(v) = file.aimd_max {
            self.aimd_max = v;
        }
        if let Some(v) = file.aimd_min {
            self.aimd_min = v;
        }
        if let Some(v) = file.aimd_additive_increase {
            self.aimd_additive_increase = v;
        }
        if let Some(v) = file.aimd_multiplicative_decrease {
            self.aimd_multiplicative_decrease = v;
        }
        if let Some(v) = file.retry_max_attempts {
            self.retry_max_attempts = v;
        }
        if let Some(ms) = file.submit_jitter_ms {
            self.submit_jitter = Duration::from_millis(ms);
        }
        self
    }

    /// Applies `DISPATCH_*` environment variable overrides on top of `self`.
    /// Unset or unparseable variables are silently skipped -- a malformed
    /// override never crashes config resolution, it just doesn't apply.
    pub fn merge_env(mut self) -> Self {
        if let Some(v) = env_usize("DISPATCH_AIMD_INITIAL") {
            self.aimd_initial = v;
        }
        if let Some(v) = env_usize("DISPATCH_AIMD_MAX") {
            self.aimd_max = v;
        }
        if let Some(v) = env_usize("DISPATCH_AIMD_MIN") {
            self.aimd_min = v;
        }
        if let Some(v) = env_usize("DISPATCH_AIMD_ADDITIVE_INCREASE") {
            self.aimd_additive_increase = v;
        }
        if let Some(v) = env_f64("DISPATCH_AIMD_MULTIPLICATIVE_DECREASE") {
            self.aimd_multiplicative_decrease = v;
        }
        if let Some(v) = env_u32("DISPATCH_RETRY_MAX_ATTEMPTS") {
            self.retry_max_attempts = v;
        }
        if let Some(v) = env_u64("DISPATCH_SUBMIT_JITTER_MS") {
            self.submit_jitter = Duration::from_millis(v);
        }
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_configuration() {
        let d = DispatchDefaults::default();
        assert_eq!(d.aimd_initial, 50);
        assert_eq!(d.aimd_max, 100);
        assert_eq!(d.aimd_min, 10);
        assert_eq!(d.retry_max_attempts, 3);
        assert_eq!(d.submit_jitter, Duration::from_millis(5));
    }

    #[test]
    fn file_layer_only_overrides_set_fields() {
        let file = DispatchFileConfig {
            aimd_max: Some(200),
            ..Default::default()
        };
        let merged = DispatchDefaults::default().merge_file(&file);
        assert_eq!(merged.aimd_max, 200);
        assert_eq!(merged.aimd_initial, 50, "untouched field keeps its default");
    }
}
