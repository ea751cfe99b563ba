//! Quéchat restaurant analytics.
//!
//! The [`analytics`] engine loads the four source datasets, joins them and
//! computes the dashboard metrics; [`session`] caches its outputs; [`ui`]
//! renders them in the terminal.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod session;
pub mod ui;

use std::io::{IsTerminal, Write};

use clap::Parser;
use clap::error::ErrorKind;
use console::Term;
use tracing::{info, warn};

pub use cli::{Cli, CliError, Commands, ParsedCli, ViewArgs, exit_code, init_tracing};
pub use config::{DashboardConfig, DataPaths};
pub use session::Session;

use analytics::Dataset;

use ui::chat::{LinePrompter, TermPrompter, run_chat};

/// Parse `raw_args` (including the program name). Help and version output
/// come back as an error with exit code 0.
pub fn parse_cli(raw_args: Vec<String>) -> Result<ParsedCli, CliError> {
    match Cli::try_parse_from(raw_args) {
        Ok(cli) => {
            let robot = cli.json;
            Ok(ParsedCli { cli, robot })
        }
        Err(err) => {
            let message = err.render().to_string();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Err(CliError {
                    code: exit_code::SUCCESS,
                    ..CliError::usage(message, None)
                }),
                _ => Err(CliError::usage(
                    message,
                    Some("Run `quechat --help` for usage.".to_string()),
                )),
            }
        }
    }
}

/// Resolve the configuration: file (or defaults), then CLI/env overrides.
pub fn load_config(cli: &Cli) -> Result<DashboardConfig, CliError> {
    let base = match &cli.config {
        Some(path) => {
            if !path.exists() {
                warn!(path = %path.display(), "config file not found; using defaults");
            }
            DashboardConfig::load_from(path)?
        }
        None => DashboardConfig::load()?,
    };
    Ok(base.with_overrides(&cli.data_overrides())?)
}

pub fn run_with_parsed(parsed: ParsedCli) -> Result<(), CliError> {
    let ParsedCli { cli, robot } = parsed;
    let config = load_config(&cli)?;
    let paths = config.data_paths();
    for dataset in Dataset::ALL {
        info!(%dataset, path = %paths.get(dataset).display(), "resolved data source");
    }
    let session = Session::open(&paths)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat_command(&session, &config.owner_name),
        Commands::View(args) => run_view(&session, &args, robot),
        Commands::Report => print_json(&session.report_json()),
    }
}

fn run_chat_command(session: &Session, owner: &str) -> Result<(), CliError> {
    let stdout = Term::stdout();
    if stdout.is_term() && std::io::stdin().is_terminal() {
        let mut term = stdout;
        run_chat(session, owner, &mut TermPrompter::new(), &mut term)?;
    } else {
        let stdin = std::io::stdin();
        let mut prompter = LinePrompter::new(stdin.lock());
        let mut out = std::io::stdout().lock();
        run_chat(session, owner, &mut prompter, &mut out)?;
    }
    Ok(())
}

fn run_view(session: &Session, args: &ViewArgs, robot: bool) -> Result<(), CliError> {
    if robot {
        return print_json(&args.view.data(session, &args.charts));
    }
    let mut out = std::io::stdout().lock();
    for line in args.view.render(session, &args.charts) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}
