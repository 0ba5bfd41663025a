use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calmfeed_policy_center::{load_policy as resolve_policy, LoadOptions, PolicySnapshot};

/// Seeds unset environment variables from `config/local.env`, so policy env
/// layers can live next to a checkout.
pub fn load_local_env_overrides() {
    let path = Path::new("config/local.env");
    if !path.exists() {
        return;
    }

    match stdfs::read_to_string(path) {
        Ok(contents) => {
            for (idx, raw_line) in contents.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    warn!(line = idx + 1, "invalid local.env entry; skipping");
                    continue;
                };
                let key = key.trim();
                if key.is_empty() || env::var(key).is_ok() {
                    continue;
                }
                env::set_var(key, unquote(value.trim()));
            }
            info!(path = %path.display(), "Loaded environment overrides from local.env");
        }
        Err(err) => {
            warn!(path = %path.display(), ?err, "failed to read local.env overrides");
        }
    }
}

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    // stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedPolicy {
    pub snapshot: PolicySnapshot,
    pub path: Option<PathBuf>,
}

/// Explicit path, else `./config/calmfeed.yaml`, else
/// `<config dir>/calmfeed/config.yaml`.
pub fn resolve_config_path(config_path: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.clone());
    }
    let local_config = PathBuf::from("config/calmfeed.yaml");
    if local_config.exists() {
        return Some(local_config);
    }
    dirs::config_dir().map(|mut path| {
        path.push("calmfeed");
        path.push("config.yaml");
        path
    })
}

pub fn load_policy(config_path: Option<&PathBuf>, overrides: &[String]) -> Result<LoadedPolicy> {
    let path = resolve_config_path(config_path);
    if let Some(explicit) = config_path {
        if !explicit.exists() {
            anyhow::bail!("Config file not found: {}", explicit.display());
        }
    }

    let options = LoadOptions {
        files: path.iter().cloned().collect(),
        cli_overrides: overrides.to_vec(),
    };
    let snapshot = resolve_policy(&options).context("Failed to load policy")?;

    match &path {
        Some(path) if path.exists() => {
            info!("Loaded policy from: {}", path.display());
        }
        _ => info!("No policy file found, using defaults"),
    }
    Ok(LoadedPolicy { snapshot, path })
}

fn unquote(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        value[1..value.len() - 1].replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_path_wins() {
        let path = PathBuf::from("/tmp/custom.yaml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.yaml");
        assert!(load_policy(Some(&path), &[]).is_err());
    }

    #[test]
    fn overrides_reach_the_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("calmfeed.yaml");
        stdfs::write(&path, "scheduler:\n  max_in_flight: 3\n").expect("write");
        let loaded = load_policy(Some(&path), &["actions.suppression_filter=blur(9px)".into()])
            .expect("policy");
        assert_eq!(loaded.snapshot.scheduler.max_in_flight, 3);
        assert_eq!(loaded.snapshot.actions.suppression_filter, "blur(9px)");
    }

    #[test]
    fn unquote_strips_wrapping_quotes() {
        assert_eq!(unquote("\"blur(1px)\""), "blur(1px)");
        assert_eq!(unquote("plain"), "plain");
    }
}
