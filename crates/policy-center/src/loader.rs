use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::defaults::default_snapshot;
use crate::errors::PolicyError;
use crate::merge::{apply_override_to_snapshot, KNOWN_PATHS};
use crate::model::{PolicySnapshot, PolicySource};

/// `CALMFEED_POLICY__SCHEDULER__INTERVAL_MS=500` sets `scheduler.interval_ms`.
const ENV_PREFIX: &str = "CALMFEED_POLICY__";
/// A JSON object, nested the same way as the YAML file.
const ENV_JSON: &str = "CALMFEED_POLICY_OVERRIDE_JSON";
/// Comma separated `path=value` pairs, with CLI provenance.
const ENV_CLI_OVERRIDES: &str = "CALMFEED_POLICY_CLI_OVERRIDES";

/// Inputs to [`load_policy`] that do not come from the process environment.
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// YAML files, applied in order. Missing files are skipped.
    pub files: Vec<PathBuf>,
    /// `path=value` pairs applied after every other layer.
    pub cli_overrides: Vec<String>,
}

/// Sources in precedence order, lowest first.
enum Layer<'a> {
    File(&'a Path),
    EnvVars,
    EnvJson,
    EnvPairs,
    Cli(&'a [String]),
}

impl fmt::Display for Layer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::File(path) => write!(f, "file {}", path.display()),
            Layer::EnvVars => write!(f, "{ENV_PREFIX}*"),
            Layer::EnvJson => f.write_str(ENV_JSON),
            Layer::EnvPairs => f.write_str(ENV_CLI_OVERRIDES),
            Layer::Cli(_) => f.write_str("command line"),
        }
    }
}

/// One `path = value` assignment produced by a layer.
struct Assignment {
    path: String,
    value: Value,
    source: PolicySource,
}

impl Layer<'_> {
    fn assignments(&self) -> Result<Vec<Assignment>, PolicyError> {
        let mut out = Vec::new();
        match self {
            Layer::File(path) => {
                if !path.exists() {
                    debug!(path = %path.display(), "policy file not found; skipping");
                    return Ok(out);
                }
                let raw = fs::read_to_string(path)
                    .map_err(|err| PolicyError::Io(format!("{}: {err}", path.display())))?;
                let yaml: serde_yaml::Value = serde_yaml::from_str(&raw)
                    .map_err(|err| PolicyError::Invalid(format!("{}: {err}", path.display())))?;
                let tree = serde_json::to_value(yaml)
                    .map_err(|err| PolicyError::Invalid(format!("{}: {err}", path.display())))?;
                flatten(tree, String::new(), PolicySource::File, &mut out);
            }
            Layer::EnvVars => {
                for (key, raw) in env::vars() {
                    let Some(path) = key.strip_prefix(ENV_PREFIX).and_then(env_key_to_path) else {
                        continue;
                    };
                    out.push(Assignment {
                        path,
                        value: parse_scalar(&raw),
                        source: PolicySource::Env,
                    });
                }
            }
            Layer::EnvJson => {
                let raw = env::var(ENV_JSON).unwrap_or_default();
                if !raw.trim().is_empty() {
                    let tree: Value = serde_json::from_str(&raw)
                        .map_err(|err| PolicyError::Invalid(format!("{ENV_JSON}: {err}")))?;
                    flatten(tree, String::new(), PolicySource::Env, &mut out);
                }
            }
            Layer::EnvPairs => {
                let raw = env::var(ENV_CLI_OVERRIDES).unwrap_or_default();
                out.extend(raw.split(',').filter_map(parse_pair));
            }
            Layer::Cli(pairs) => {
                out.extend(pairs.iter().filter_map(|pair| parse_pair(pair)));
            }
        }
        Ok(out)
    }
}

/// Resolves the policy: built-in defaults, then each file, then the
/// environment, then `options.cli_overrides`. Every known path ends up with a
/// recorded source.
pub fn load_policy(options: &LoadOptions) -> Result<PolicySnapshot, PolicyError> {
    let mut snapshot = default_snapshot();
    for path in KNOWN_PATHS {
        snapshot.set_provenance(path, PolicySource::Builtin);
    }

    let mut layers: Vec<Layer<'_>> = options
        .files
        .iter()
        .map(|path| Layer::File(path.as_path()))
        .collect();
    layers.extend([
        Layer::EnvVars,
        Layer::EnvJson,
        Layer::EnvPairs,
        Layer::Cli(&options.cli_overrides),
    ]);

    for layer in &layers {
        let assignments = layer.assignments()?;
        if assignments.is_empty() {
            continue;
        }
        debug!(layer = %layer, entries = assignments.len(), "applying policy layer");
        for assignment in assignments {
            apply_override_to_snapshot(
                &mut snapshot,
                &assignment.path,
                &assignment.value,
                assignment.source,
            )?;
        }
    }

    Ok(snapshot)
}

/// `SCHEDULER__INTERVAL_MS` becomes `scheduler.interval_ms`.
fn env_key_to_path(key: &str) -> Option<String> {
    let segments: Vec<String> = key
        .split("__")
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!segments.is_empty()).then(|| segments.join("."))
}

fn parse_pair(pair: &str) -> Option<Assignment> {
    let (path, raw) = pair.split_once('=').unwrap_or((pair, ""));
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    Some(Assignment {
        path: path.to_string(),
        value: parse_scalar(raw.trim()),
        source: PolicySource::Cli,
    })
}

/// JSON when it parses (`true`, `250`, `0.3`), otherwise the raw string.
fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn flatten(value: Value, prefix: String, source: PolicySource, out: &mut Vec<Assignment>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.trim().to_ascii_lowercase();
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, path, source, out);
            }
        }
        leaf if !prefix.is_empty() => out.push(Assignment {
            path: prefix,
            value: leaf,
            source,
        }),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_dotted_paths() {
        assert_eq!(
            env_key_to_path("DECISION__BLOCK_THRESHOLD").as_deref(),
            Some("decision.block_threshold")
        );
        assert_eq!(env_key_to_path("__"), None);
    }

    #[test]
    fn scalars_prefer_json() {
        assert_eq!(parse_scalar("250"), Value::from(250));
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("blur(4px)"), Value::from("blur(4px)"));
        assert_eq!(parse_scalar(""), Value::Null);
    }

    #[test]
    fn pairs_without_a_path_are_dropped() {
        assert!(parse_pair(" =3").is_none());
        let pair = parse_pair(" scheduler.max_in_flight = 4 ").expect("pair");
        assert_eq!(pair.path, "scheduler.max_in_flight");
        assert_eq!(pair.value, Value::from(4));
    }

    #[test]
    fn yaml_root_scalar_yields_nothing() {
        let mut out = Vec::new();
        flatten(Value::from(3), String::new(), PolicySource::File, &mut out);
        assert!(out.is_empty());
    }
}
