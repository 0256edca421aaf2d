//! Resolves the layered [`DispatchDefaults`] the binary actually runs with:
//! built-in defaults, then an optional `dispatch.toml` (explicit `--config`
//! path, or `dirs::config_dir()/dispatch/dispatch.toml` if present), then
//! `DISPATCH_*` environment variables. CLI flags are applied by the caller
//! on top of whatever this returns.

use anyhow::{Context, Result};
use dispatch_core::{DispatchDefaults, DispatchFileConfig};

pub async fn load(explicit_path: Option<&str>) -> Result<DispatchDefaults> {
    let defaults = DispatchDefaults::default();

    let defaults = match resolve_config_path(explicit_path) {
        Some(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading config file {}", path.display()))?;
            let file: DispatchFileConfig = toml::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            defaults.merge_file(&file)
        }
        None => defaults,
    };

    Ok(defaults.merge_env())
}

fn resolve_config_path(explicit_path: Option<&str>) -> Option<std::path::PathBuf> {
    if let Some(p) = explicit_path {
        return Some(std::path::PathBuf::from(p));
    }
    let candidate = dirs::config_dir()?.join("dispatch").join("dispatch.toml");
    candidate.exists().then_some(candidate)
}
