//! `mlops-profiler`: report a profiler lifecycle event for the current run.
//!
//! Identity comes from the settings file and `MLOPS_*` environment
//! variables. Events are written to stdout as `topic<TAB>payload` lines.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};

use profiler_core::ids::EdgeId;
use profiler_core::logging::init_subscriber;
use profiler_emitter::{BrokerConnector, EmitterCell, StdoutConnector};
use profiler_settings::{ProfilerSettings, load_settings, settings_path};

/// Emit a profiler event for a distributed training run.
#[derive(Debug, Parser)]
#[command(name = "mlops-profiler", version, about)]
struct Cli {
    /// Settings file (defaults to `$MLOPS_PROFILER_SETTINGS` or `~/.mlops/profiler.json`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report that an activity started.
    Started(EventArgs),
    /// Report that an activity ended.
    Ended(EventArgs),
}

#[derive(Debug, Args)]
struct EventArgs {
    /// Activity name, e.g. `train` or `aggregate`.
    name: String,

    /// Free-form value attached to the event.
    #[arg(long)]
    value: Option<String>,

    /// Report under this edge id instead of the configured one.
    #[arg(long)]
    edge_id: Option<i64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(settings_path);
    let loaded = load_settings(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    let settings = &loaded.settings;

    init_subscriber(&settings.logging.level, settings.logging.format);
    loaded.log_rejected();
    debug!(path = %path.display(), "profiler settings loaded");

    emit(&cli.command, settings, &StdoutConnector)
        .inspect_err(|e| error!(kind = e.error_kind(), error = %e, "profiler event failed"))
        .context("failed to emit profiler event")
}

/// Build the emitter from `settings` and report the requested event.
fn emit(
    command: &Command,
    settings: &ProfilerSettings,
    connector: &dyn BrokerConnector,
) -> profiler_core::Result<()> {
    let cell = EmitterCell::new();
    let emitter = cell.get_or_create_from_settings(settings, connector)?;

    match command {
        Command::Started(args) => {
            emitter.log_event_started(&args.name, args.value.as_deref(), args.edge_id())?;
        }
        Command::Ended(args) => {
            emitter.log_event_ended(&args.name, args.value.as_deref(), args.edge_id())?;
        }
    }
    Ok(())
}

impl EventArgs {
    fn edge_id(&self) -> Option<EdgeId> {
        self.edge_id.map(EdgeId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use profiler_core::errors::{ConfigError, ProfilerError};
    use profiler_core::logging::capture_logs;
    use profiler_emitter::MemoryConnector;
    use profiler_settings::load_settings_with;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("mlops-profiler").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    fn settings_file(dir: &tempfile::TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("profiler.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn parses_ended_with_options() {
        let cli = parse(&[
            "--config", "/tmp/p.json", "ended", "train", "--value", "v", "--edge-id", "4",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.json")));
        assert_matches!(
            cli.command,
            Command::Ended(EventArgs { ref name, ref value, edge_id: Some(4) })
                if name == "train" && value.as_deref() == Some("v")
        );
    }

    #[test]
    fn config_flag_is_global() {
        let cli = parse(&["started", "init", "--config", "/tmp/p.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.json")));
        assert_matches!(cli.command, Command::Started(_));
    }

    #[test]
    fn emits_ended_twice_with_override_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir, r#"{"runId": "r1", "serverId": 7}"#);
        let loaded = load_settings_with(&path, |_| None).unwrap();
        let cli = parse(&["ended", "train", "--value", "v", "--edge-id", "11"]);
        let connector = MemoryConnector::new();

        emit(&cli.command, &loaded.settings, &connector).unwrap();

        let published = connector.broker().published();
        assert_eq!(published.len(), 2);
        let payload = published[0].json().unwrap();
        assert_eq!(payload["edge_id"], 11);
        assert_eq!(payload["event_name"], "train");
        assert_eq!(payload["event_value"], "v");
    }

    #[test]
    fn rejected_env_values_are_warned_after_subscriber_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir, r#"{"runId": "r1", "serverId": 7}"#);
        let lookup = |name: &str| match name {
            "MLOPS_SERVER_ID" => Some("seven".to_string()),
            "MLOPS_RANK" => Some("-3".to_string()),
            _ => None,
        };
        let loaded = load_settings_with(&path, lookup).unwrap();

        let (logs, _guard) = capture_logs();
        loaded.log_rejected();
        let cli = parse(&["started", "init"]);
        let connector = MemoryConnector::new();
        emit(&cli.command, &loaded.settings, &connector).unwrap();

        assert_eq!(logs.count_at_level(tracing::Level::WARN), 2);
        assert_eq!(connector.broker().published()[0].json().unwrap()["edge_id"], 7);
    }

    #[test]
    fn config_errors_carry_their_kind() {
        let settings = ProfilerSettings {
            rank: 2,
            ..Default::default()
        };
        let cli = parse(&["started", "init"]);
        let connector = MemoryConnector::new();

        let err = emit(&cli.command, &settings, &connector).unwrap_err();
        assert_eq!(err.error_kind(), "configuration");
        assert_matches!(err, ProfilerError::Config(ConfigError::MissingRunId));
        assert_eq!(connector.connect_count(), 0);
    }

    #[test]
    fn publish_errors_carry_their_kind() {
        let settings = ProfilerSettings {
            run_id: Some("r1".into()),
            ..Default::default()
        };
        let cli = parse(&["ended", "init"]);
        let connector = MemoryConnector::new();
        connector.broker().set_failing(true);

        let err = emit(&cli.command, &settings, &connector).unwrap_err();
        assert_eq!(err.error_kind(), "publish");
    }
}
