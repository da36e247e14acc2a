//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ProfilerSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `MLOPS_*` environment variable overrides (highest priority)
//!
//! Env values that fail to parse are skipped and returned as
//! [`RejectedEnvVar`]s. Loading usually happens before the tracing subscriber
//! is installed, so the caller logs them with
//! [`LoadedSettings::log_rejected`] once it is.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use profiler_core::identity::ClientIdList;
use profiler_core::ids::{EdgeId, RunId};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::ProfilerSettings;

/// Env var naming an explicit settings file.
pub const SETTINGS_PATH_ENV: &str = "MLOPS_PROFILER_SETTINGS";

/// An env override that failed to parse and was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedEnvVar {
    /// Variable name.
    pub key: &'static str,
    /// Value as found in the environment.
    pub value: String,
    /// What the value should have been.
    pub expected: &'static str,
}

impl RejectedEnvVar {
    /// Emit the `warn` diagnostic for this override.
    pub fn log(&self) {
        warn!(
            key = self.key,
            value = %self.value,
            expected = self.expected,
            "invalid env var, ignoring"
        );
    }
}

/// Settings plus the env overrides rejected while loading them.
#[derive(Clone, Debug)]
pub struct LoadedSettings {
    /// Merged settings.
    pub settings: ProfilerSettings,
    /// Overrides that were skipped, in the order they were read.
    pub rejected: Vec<RejectedEnvVar>,
}

impl LoadedSettings {
    /// Log every rejected override at `warn`.
    pub fn log_rejected(&self) {
        for rejected in &self.rejected {
            rejected.log();
        }
    }
}

/// Resolve the settings file path from the process environment.
///
/// `$MLOPS_PROFILER_SETTINGS` if set, else `~/.mlops/profiler.json`.
pub fn settings_path() -> PathBuf {
    settings_path_with(process_env)
}

/// [`settings_path`] with an explicit env lookup.
pub fn settings_path_with<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    if let Some(path) = read(SETTINGS_PATH_ENV) {
        return PathBuf::from(path);
    }
    let home = read("HOME").unwrap_or_else(|| "/tmp".to_string());
    PathBuf::from(home).join(".mlops").join("profiler.json")
}

/// Load settings from `path` with process env overrides applied.
///
/// A missing file yields defaults; a file with invalid JSON is an error.
pub fn load_settings(path: &Path) -> Result<LoadedSettings> {
    load_settings_with(path, process_env)
}

/// [`load_settings`] with an explicit env lookup.
pub fn load_settings_with<F>(path: &Path, lookup: F) -> Result<LoadedSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = load_file_layer(path)?;
    let rejected = apply_env_overrides_with(&mut settings, lookup);
    Ok(LoadedSettings { settings, rejected })
}

/// Defaults merged with the file at `path`, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<ProfilerSettings> {
    let defaults = serde_json::to_value(ProfilerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading profiler settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "profiler settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides read through `lookup`.
///
/// Empty values are treated as unset. Values that fail to parse keep the
/// file/default value and are returned so the caller can report them.
pub fn apply_env_overrides_with<F>(
    settings: &mut ProfilerSettings,
    lookup: F,
) -> Vec<RejectedEnvVar>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let mut rejected = Vec::new();
    let mut reject = |key: &'static str, value: String, expected: &'static str| {
        rejected.push(RejectedEnvVar {
            key,
            value,
            expected,
        });
    };

    // ── Identity ────────────────────────────────────────────────────
    if let Some(v) = read("MLOPS_RUN_ID") {
        settings.run_id = Some(RunId::parse_lossy(&v));
    }
    if let Some(v) = read("MLOPS_RANK") {
        match parse_i64_range(&v, 0, i64::MAX) {
            Some(rank) => settings.rank = rank,
            None => reject("MLOPS_RANK", v, "non-negative rank"),
        }
    }
    if let Some(v) = read("MLOPS_SERVER_ID") {
        match v.parse::<EdgeId>() {
            Ok(id) => settings.server_id = Some(id),
            Err(_) => reject("MLOPS_SERVER_ID", v, "integer edge id"),
        }
    }
    if let Some(v) = read("MLOPS_CLIENT_ID_LIST") {
        // decoded (and validated) when the run config is built
        settings.client_id_list = Some(ClientIdList::Encoded(v));
    }

    // ── Broker ──────────────────────────────────────────────────────
    if let Some(v) = read("MLOPS_MQTT_CONFIG_PATH") {
        settings.broker.mqtt_config_path = Some(PathBuf::from(v));
    }
    if let Some(v) = read("MLOPS_S3_CONFIG_PATH") {
        settings.broker.s3_config_path = Some(PathBuf::from(v));
    }

    // ── Events / logging ────────────────────────────────────────────
    if let Some(v) = read("MLOPS_DUPLICATE_ENDED_PUBLISH") {
        match parse_bool(&v) {
            Some(b) => settings.events.duplicate_ended_publish = b,
            None => reject("MLOPS_DUPLICATE_ENDED_PUBLISH", v, "boolean"),
        }
    }
    if let Some(v) = read("MLOPS_LOG_LEVEL") {
        settings.logging.level = v;
    }

    rejected
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as an `i64` within an inclusive range.
pub fn parse_i64_range(val: &str, min: i64, max: i64) -> Option<i64> {
    let n: i64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::errors::SettingsError;
    use assert_matches::assert_matches;
    use profiler_core::errors::ConfigError;
    use profiler_core::logging::capture_logs;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_settings(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiler.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"broker": {"mqttConfigPath": "a", "s3ConfigPath": "b"}});
        let source = serde_json::json!({"broker": {"mqttConfigPath": "c"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["broker"]["mqttConfigPath"], "c");
        assert_eq!(merged["broker"]["s3ConfigPath"], "b");
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"clientIdList": [1, 2, 3]});
        let source = serde_json::json!({"clientIdList": [4]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["clientIdList"], serde_json::json!([4]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"rank": 1, "runId": "r1"});
        let source = serde_json::json!({"runId": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["runId"], "r1");
        assert_eq!(merged["rank"], 1);
    }

    #[test]
    fn merge_new_keys_added() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── load_file_layer ─────────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = load_file_layer(Path::new("/nonexistent/profiler.json")).unwrap();
        assert!(settings.run_id.is_none());
        assert!(settings.events.duplicate_ended_publish);
    }

    #[test]
    fn partial_json_overrides() {
        let (_dir, path) = write_settings(
            r#"{"runId": "r1", "rank": 2, "clientIdList": "[9,10]", "events": {"duplicateEndedPublish": false}}"#,
        );
        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.run_id, Some(RunId::from("r1")));
        assert_eq!(settings.rank, 2);
        assert!(!settings.events.duplicate_ended_publish);
        assert_eq!(settings.logging.level, "info");

        let config = settings.to_run_config().unwrap();
        assert_eq!(config.edge_id(), EdgeId::new(9));
    }

    #[test]
    fn nested_section_keeps_sibling_defaults() {
        let (_dir, path) = write_settings(r#"{"logging": {"format": "json"}}"#);
        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.logging.level, "info");
        assert_eq!(
            settings.logging.format,
            profiler_core::logging::LogFormat::Json
        );
    }

    #[test]
    fn invalid_json_returns_error() {
        let (_dir, path) = write_settings("not valid json");
        assert_matches!(load_file_layer(&path), Err(SettingsError::Json(_)));
    }

    #[test]
    fn wrong_type_returns_error() {
        let (_dir, path) = write_settings(r#"{"rank": "two"}"#);
        assert_matches!(load_file_layer(&path), Err(SettingsError::Json(_)));
    }

    #[test]
    fn malformed_client_ids_fail_identically_in_both_forms() {
        for list in [r#"["a"]"#, r#""[\"a\"]""#] {
            let (_dir, path) =
                write_settings(&format!(r#"{{"runId": "r1", "rank": 1, "clientIdList": {list}}}"#));
            let settings = load_file_layer(&path).unwrap();
            assert_matches!(
                settings.to_run_config(),
                Err(ConfigError::MalformedClientIdList(_)),
                "expected malformed for {list}"
            );
        }
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn env_overrides_identity() {
        let mut settings = ProfilerSettings::default();
        let rejected = apply_env_overrides_with(
            &mut settings,
            env(&[
                ("MLOPS_RUN_ID", "1200"),
                ("MLOPS_RANK", "3"),
                ("MLOPS_CLIENT_ID_LIST", "[21, 22]"),
            ]),
        );
        assert!(rejected.is_empty());
        assert_eq!(settings.run_id, Some(RunId::Numeric(1200)));
        assert_eq!(settings.rank, 3);
        assert_eq!(settings.to_run_config().unwrap().edge_id(), EdgeId::new(21));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let (_dir, path) = write_settings(r#"{"runId": "from-file", "serverId": 1}"#);
        let mut settings = load_file_layer(&path).unwrap();
        let _ = apply_env_overrides_with(
            &mut settings,
            env(&[("MLOPS_RUN_ID", "from-env"), ("MLOPS_SERVER_ID", "8")]),
        );
        assert_eq!(settings.run_id, Some(RunId::from("from-env")));
        assert_eq!(settings.server_id, Some(EdgeId::new(8)));
    }

    #[test]
    fn env_overrides_broker_and_events() {
        let mut settings = ProfilerSettings::default();
        let _ = apply_env_overrides_with(
            &mut settings,
            env(&[
                ("MLOPS_MQTT_CONFIG_PATH", "/etc/mqtt.yaml"),
                ("MLOPS_S3_CONFIG_PATH", "/etc/s3.yaml"),
                ("MLOPS_DUPLICATE_ENDED_PUBLISH", "off"),
                ("MLOPS_LOG_LEVEL", "debug"),
            ]),
        );
        assert_eq!(
            settings.broker.mqtt_config_path,
            Some(PathBuf::from("/etc/mqtt.yaml"))
        );
        assert_eq!(settings.broker.s3_config_path, Some(PathBuf::from("/etc/s3.yaml")));
        assert!(!settings.events.duplicate_ended_publish);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn invalid_env_values_are_rejected_not_applied() {
        let mut settings = ProfilerSettings {
            rank: 1,
            ..Default::default()
        };
        let rejected = apply_env_overrides_with(
            &mut settings,
            env(&[
                ("MLOPS_RANK", "-2"),
                ("MLOPS_SERVER_ID", "seven"),
                ("MLOPS_DUPLICATE_ENDED_PUBLISH", "maybe"),
            ]),
        );
        assert_eq!(settings.rank, 1);
        assert!(settings.server_id.is_none());
        assert!(settings.events.duplicate_ended_publish);

        let keys: Vec<&str> = rejected.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            ["MLOPS_RANK", "MLOPS_SERVER_ID", "MLOPS_DUPLICATE_ENDED_PUBLISH"]
        );
        assert_eq!(rejected[1].value, "seven");
    }

    #[test]
    fn rejections_are_reported_once_a_subscriber_exists() {
        let (_dir, path) = write_settings(r#"{"runId": "r1", "serverId": 7}"#);
        // loaded with no subscriber installed, as the CLI does
        let loaded = load_settings_with(
            &path,
            env(&[("MLOPS_SERVER_ID", "seven"), ("MLOPS_RANK", "-3")]),
        )
        .unwrap();
        assert_eq!(loaded.settings.server_id, Some(EdgeId::new(7)));
        assert_eq!(loaded.settings.rank, 0);

        let (logs, _guard) = capture_logs();
        loaded.log_rejected();
        assert_eq!(logs.count_at_level(tracing::Level::WARN), 2);
        let warned = logs.events();
        assert_eq!(warned[0].field("key"), Some("MLOPS_SERVER_ID"));
        assert_eq!(warned[0].field("value"), Some("seven"));
        assert_eq!(warned[1].field("key"), Some("MLOPS_RANK"));
        assert!(logs.has_event(tracing::Level::WARN, "invalid env var, ignoring"));
    }

    #[test]
    fn load_settings_with_applies_env_over_file() {
        let (_dir, path) = write_settings(r#"{"runId": "r1", "rank": 2, "clientIdList": [9]}"#);
        let loaded = load_settings_with(&path, env(&[("MLOPS_CLIENT_ID_LIST", "[30, 31]")])).unwrap();
        assert!(loaded.rejected.is_empty());
        assert_eq!(
            loaded.settings.to_run_config().unwrap().edge_id(),
            EdgeId::new(30)
        );
    }

    #[test]
    fn load_settings_reads_process_env() {
        let (_dir, path) = write_settings(r#"{"runId": "r1"}"#);
        let loaded = load_settings(&path).unwrap();
        assert!(loaded.settings.run_id.is_some());
    }

    // ── settings_path ───────────────────────────────────────────────

    #[test]
    fn settings_path_prefers_explicit_env() {
        let path = settings_path_with(env(&[
            (SETTINGS_PATH_ENV, "/etc/mlops/profiler.json"),
            ("HOME", "/home/alice"),
        ]));
        assert_eq!(path, PathBuf::from("/etc/mlops/profiler.json"));
    }

    #[test]
    fn settings_path_defaults_under_home() {
        let path = settings_path_with(env(&[("HOME", "/home/alice")]));
        assert_eq!(path, PathBuf::from("/home/alice/.mlops/profiler.json"));

        let path = settings_path_with(env(&[(SETTINGS_PATH_ENV, ""), ("HOME", "/home/alice")]));
        assert_eq!(path, PathBuf::from("/home/alice/.mlops/profiler.json"));
    }

    #[test]
    fn settings_path_without_home() {
        let path = settings_path_with(env(&[]));
        assert_eq!(path, PathBuf::from("/tmp/.mlops/profiler.json"));
    }

    #[test]
    fn empty_env_values_are_unset() {
        let mut settings = ProfilerSettings {
            run_id: Some(RunId::from("kept")),
            ..Default::default()
        };
        let rejected = apply_env_overrides_with(&mut settings, env(&[("MLOPS_RUN_ID", "")]));
        assert!(rejected.is_empty());
        assert_eq!(settings.run_id, Some(RunId::from("kept")));
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in ["true", "1", "yes", "on", "TRUE", " On "] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in ["false", "0", "no", "off", "No"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn parse_i64_range_bounds() {
        assert_eq!(parse_i64_range("0", 0, 10), Some(0));
        assert_eq!(parse_i64_range("10", 0, 10), Some(10));
        assert_eq!(parse_i64_range("11", 0, 10), None);
        assert_eq!(parse_i64_range("-1", 0, 10), None);
        assert_eq!(parse_i64_range("abc", 0, 10), None);
    }
}
