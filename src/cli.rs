//! Command-line surface and the error envelope shared by every command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::analytics::AnalyticsError;
use crate::config::{ConfigError, DataOverrides};
use crate::ui::charts::ChartKind;
use crate::ui::chat::Command;

/// quechat - restaurant analytics portal
#[derive(Parser, Debug)]
#[command(name = "quechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the source CSV files
    #[arg(long, env = "QUECHAT_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Menu categories file
    #[arg(long, env = "QUECHAT_CATEGORIES", global = true)]
    pub categories: Option<PathBuf>,

    /// Menu items file
    #[arg(long, env = "QUECHAT_MENU", global = true)]
    pub menu: Option<PathBuf>,

    /// Order lines file
    #[arg(long, env = "QUECHAT_ORDERS", global = true)]
    pub orders: Option<PathBuf>,

    /// Customer feedback file
    #[arg(long, env = "QUECHAT_FEEDBACK", global = true)]
    pub feedback: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Machine-readable output (JSON on stdout, JSON errors on stderr)
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Talk to the analytics assistant (default)
    Chat,

    /// Render a single view and exit
    View(ViewArgs),

    /// Print every metric and chart series as JSON
    Report,
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Which view to render
    #[arg(value_enum)]
    pub view: Command,

    /// Charts to include in the charts view (repeatable; default all)
    #[arg(long = "chart", value_enum)]
    pub charts: Vec<ChartKind>,
}

impl Cli {
    pub fn data_overrides(&self) -> DataOverrides {
        DataOverrides {
            dir: self.data_dir.clone(),
            categories: self.categories.clone(),
            menu: self.menu.clone(),
            orders: self.orders.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

/// Parsed arguments plus whether errors should be reported as JSON.
#[derive(Debug)]
pub struct ParsedCli {
    pub cli: Cli,
    pub robot: bool,
}

/// Error reported by the binary: the process exit code and the fields of
/// the `{"error": {...}}` payload printed in robot mode.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub code: i32,
    pub kind: &'static str,
    pub message: String,
    pub hint: Option<String>,
    pub retryable: bool,
}

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const SOURCE_NOT_FOUND: i32 = 3;
    pub const SCHEMA_MISMATCH: i32 = 4;
}

impl CliError {
    pub fn usage(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            code: exit_code::USAGE,
            kind: "usage",
            message: message.into(),
            hint,
            retryable: false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self })
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<AnalyticsError> for CliError {
    fn from(err: AnalyticsError) -> Self {
        let code = match &err {
            AnalyticsError::SourceNotFound { .. } => exit_code::SOURCE_NOT_FOUND,
            AnalyticsError::SchemaMismatch { .. } => exit_code::SCHEMA_MISMATCH,
            AnalyticsError::SourceUnreadable { .. } | AnalyticsError::EmptyResult(_) => {
                exit_code::FAILURE
            }
        };
        Self {
            code,
            kind: err.kind(),
            message: err.to_string(),
            hint: Some(err.suggestion().to_string()),
            retryable: false,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Parse(_) | ConfigError::Validation(_) => {
                "Fix the config file or pass --config with another path."
            }
            ConfigError::Read(_) => "Check that the config file is readable.",
            ConfigError::NoConfigDir => "Pass --config explicitly.",
        };
        Self {
            code: exit_code::USAGE,
            kind: "config",
            message: err.to_string(),
            hint: Some(hint.to_string()),
            retryable: false,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            code: exit_code::FAILURE,
            kind: "io",
            message: format!("{err:#}"),
            hint: None,
            retryable: true,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        anyhow::Error::from(err).into()
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--log-level`; logs
/// always go to stderr.
pub fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let ansi = std::env::var_os("NO_COLOR").is_none();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Dataset;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quechat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_means_chat() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.json);
    }

    #[test]
    fn view_takes_repeated_charts() {
        let cli = parse(&[
            "view",
            "charts",
            "--chart",
            "ordering-times",
            "--chart",
            "categories",
            "--json",
        ]);
        match cli.command {
            Some(Commands::View(args)) => {
                assert_eq!(args.view, Command::Charts);
                assert_eq!(
                    args.charts,
                    vec![ChartKind::OrderingTimes, ChartKind::Categories]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.json);
    }

    #[test]
    fn global_data_flags_become_overrides() {
        let cli = parse(&["report", "--data-dir", "/data", "--orders", "orders.csv"]);
        let overrides = cli.data_overrides();
        assert_eq!(overrides.dir, Some(PathBuf::from("/data")));
        assert_eq!(overrides.orders, Some(PathBuf::from("orders.csv")));
        assert!(overrides.menu.is_none());
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert!(Cli::try_parse_from(["quechat", "view", "refunds"]).is_err());
    }

    #[test]
    fn analytics_errors_map_to_exit_codes() {
        let missing: CliError = AnalyticsError::SourceNotFound {
            dataset: Dataset::Orders,
            path: PathBuf::from("/nowhere/order_data.csv"),
        }
        .into();
        assert_eq!(missing.code, exit_code::SOURCE_NOT_FOUND);
        assert_eq!(missing.kind, "source-not-found");
        assert!(missing.hint.is_some());

        let mismatch: CliError = AnalyticsError::SchemaMismatch {
            dataset: Dataset::Menu,
            column: "price".into(),
            row: Some(2),
            detail: "expected decimal, got 'abc'".into(),
        }
        .into();
        assert_eq!(mismatch.code, exit_code::SCHEMA_MISMATCH);

        let config: CliError = ConfigError::Validation("owner_name cannot be empty".into()).into();
        assert_eq!(config.code, exit_code::USAGE);
        assert_eq!(config.kind, "config");
    }

    #[test]
    fn robot_payload_shape() {
        let err = CliError::usage("bad flag", None);
        let json = err.to_json();
        assert_eq!(json["error"]["code"], 2);
        assert_eq!(json["error"]["kind"], "usage");
        assert_eq!(json["error"]["message"], "bad flag");
        assert!(json["error"]["hint"].is_null());
        assert_eq!(json["error"]["retryable"], false);
    }
}
