use crate::defaults::default_snapshot;
use crate::loader::{load_policy, LoadOptions};
use crate::model::{PolicySource, PolicyView};
use crate::PolicyError;
use decision_engine::ScorerFailurePolicy;
use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

#[test]
fn default_snapshot_matches_documented_loop() {
    let snapshot = default_snapshot();
    assert_eq!(snapshot.scheduler.interval_ms, 1_000);
    assert_eq!(snapshot.decision.block_threshold, 0.1);
    assert_eq!(
        snapshot.decision.on_scorer_error,
        ScorerFailurePolicy::FailOpen
    );
    assert_eq!(snapshot.actions.suppression_filter, "blur(2px)");
}

#[test]
fn file_layer_overrides_defaults() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("calmfeed.yaml");
    std::fs::write(
        &file_path,
        r#"scheduler:
  interval_ms: 250
  max_in_flight: 2
decision:
  block_threshold: -0.5
  on_scorer_error: fail_closed
"#,
    )
    .unwrap();

    let snapshot = load_policy(&from_file(&file_path)).unwrap();
    assert_eq!(snapshot.scheduler.interval_ms, 250);
    assert_eq!(snapshot.scheduler.max_in_flight, 2);
    assert_eq!(snapshot.decision.block_threshold, -0.5);
    assert_eq!(
        snapshot.decision.on_scorer_error,
        ScorerFailurePolicy::FailClosed
    );
    assert_eq!(
        snapshot.source_of("scheduler.interval_ms"),
        Some(PolicySource::File)
    );
    assert_eq!(
        snapshot.source_of("actions.suppression_filter"),
        Some(PolicySource::Builtin)
    );
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let snapshot = load_policy(&from_file(&dir.path().join("absent.yaml"))).unwrap();
    assert_eq!(snapshot.scheduler.interval_ms, 1_000);
}

#[test]
fn unknown_paths_are_rejected() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("calmfeed.yaml");
    std::fs::write(&file_path, "scheduler:\n  turbo: true\n").unwrap();
    let err = load_policy(&from_file(&file_path)).unwrap_err();
    assert!(matches!(err, PolicyError::UnsupportedPath(path) if path == "scheduler.turbo"));
}

#[test]
fn zero_interval_is_invalid() {
    let _guard = env_guard().lock().unwrap();
    let options = LoadOptions {
        cli_overrides: vec!["scheduler.interval_ms=0".into()],
        ..LoadOptions::default()
    };
    assert!(matches!(
        load_policy(&options),
        Err(PolicyError::InvalidValue(_))
    ));
}

#[test]
fn env_layer_overrides_file_and_records_provenance() {
    let _guard = env_guard().lock().unwrap();
    let key = "CALMFEED_POLICY__SCHEDULER__INTERVAL_MS";
    env::set_var(key, "500");
    let snapshot = load_policy(&LoadOptions::default()).expect("load snapshot");
    env::remove_var(key);
    assert_eq!(snapshot.scheduler.interval_ms, 500);
    assert_eq!(
        snapshot.source_of("scheduler.interval_ms"),
        Some(PolicySource::Env)
    );
}

#[test]
fn cli_overrides_apply_last() {
    let _guard = env_guard().lock().unwrap();
    env::set_var(
        "CALMFEED_POLICY_CLI_OVERRIDES",
        "decision.block_threshold=0.3,actions.suppression_filter=blur(6px)",
    );
    let options = LoadOptions {
        cli_overrides: vec!["decision.block_threshold=0.25".into()],
        ..LoadOptions::default()
    };
    let snapshot = load_policy(&options).expect("load snapshot with cli");
    env::remove_var("CALMFEED_POLICY_CLI_OVERRIDES");
    assert_eq!(snapshot.decision.block_threshold, 0.25);
    assert_eq!(snapshot.actions.suppression_filter, "blur(6px)");
    assert_eq!(
        snapshot.source_of("decision.block_threshold"),
        Some(PolicySource::Cli)
    );
}

#[test]
fn json_env_layer_applies_after_prefixed_vars() {
    let _guard = env_guard().lock().unwrap();
    env::set_var("CALMFEED_POLICY__DECISION__SCORER_TIMEOUT_MS", "900");
    env::set_var(
        "CALMFEED_POLICY_OVERRIDE_JSON",
        r#"{"decision": {"scorer_timeout_ms": 500, "on_scorer_error": "fail_closed"}}"#,
    );
    let result = load_policy(&LoadOptions::default());
    env::remove_var("CALMFEED_POLICY__DECISION__SCORER_TIMEOUT_MS");
    env::remove_var("CALMFEED_POLICY_OVERRIDE_JSON");

    let snapshot = result.expect("load snapshot");
    assert_eq!(snapshot.decision.scorer_timeout_ms, 500);
    assert_eq!(
        snapshot.decision.on_scorer_error,
        ScorerFailurePolicy::FailClosed
    );
    assert_eq!(
        snapshot.source_of("decision.scorer_timeout_ms"),
        Some(PolicySource::Env)
    );
}

#[test]
fn malformed_json_env_is_rejected() {
    let _guard = env_guard().lock().unwrap();
    env::set_var("CALMFEED_POLICY_OVERRIDE_JSON", "{not json");
    let result = load_policy(&LoadOptions::default());
    env::remove_var("CALMFEED_POLICY_OVERRIDE_JSON");
    assert!(matches!(result, Err(PolicyError::Invalid(_))));
}

#[test]
fn view_exposes_runtime_configs() {
    let view = PolicyView::from(default_snapshot());
    assert_eq!(view.interval(), Duration::from_secs(1));
    let decision = view.decision_config();
    assert_eq!(decision.block_threshold, 0.1);
    assert_eq!(decision.scorer_timeout, Duration::from_secs(2));
}

fn from_file(path: &Path) -> LoadOptions {
    LoadOptions {
        files: vec![path.to_path_buf()],
        ..LoadOptions::default()
    }
}

fn env_guard() -> &'static Mutex<()> {
    static ENV_GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_GUARD.get_or_init(|| Mutex::new(()))
}
