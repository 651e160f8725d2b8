mod cli;
mod config;
mod connect;
mod context;
mod credentials;
mod demo;
mod dialogs;
mod error;
mod pkg;
mod sequencer;
mod ui;
mod wizard;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use console::Style;

use cli::{Cli, Command};
use config::{Mode, WizardConfig};
use connect::ConnectClient;
use error::WizardError;
use pkg::CommandPkgManager;
use sequencer::TerminalResult;
use ui::TermUi;
use wizard::{RegistrationWizard, RunRecord};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", Style::new().red().bold().apply_to("✗"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, WizardError> {
    let mut config = WizardConfig::load().map_err(|err| WizardError::Config(err.to_string()))?;
    if let Some(url) = cli.url {
        config.url = url;
    }
    reqwest::Url::parse(&config.url).map_err(|err| {
        WizardError::Config(format!("invalid server URL \"{}\": {err}", config.url))
    })?;
    let mode = cli.mode.map(Mode::from).unwrap_or(Mode::Normal);

    match cli.command {
        Command::Register => run_wizard(config, mode, false, cli.verbose).await,
        Command::Extensions => run_wizard(config, mode, true, cli.verbose).await,
        Command::Status => status(&config),
        Command::Demo => {
            let record = demo::run().await?;
            print_record(&record);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_wizard(
    config: WizardConfig,
    mode: Mode,
    extensions: bool,
    verbose: bool,
) -> Result<ExitCode, WizardError> {
    let service = ConnectClient::with_base_url(
        config.url.clone(),
        Duration::from_secs(config.timeout_secs),
        config.insecure,
    );
    let pkg = CommandPkgManager::new(
        config.pkg_command.clone(),
        PathBuf::from(&config.base_product_path),
    );
    let mut wizard = RegistrationWizard::new(service, TermUi::new(), pkg, config, mode);

    let record = wizard.run(extensions).await?;

    match record.result {
        TerminalResult::Abort => {
            println!(
                "{} Registration aborted",
                Style::new().yellow().apply_to("↯")
            );
        }
        result => {
            println!(
                "{} Registration workflow finished ({result})",
                Style::new().green().bold().apply_to("✓")
            );
        }
    }
    if verbose {
        print_record(&record);
    }

    Ok(match record.result {
        TerminalResult::Abort => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn status(config: &WizardConfig) -> Result<ExitCode, WizardError> {
    let path = Path::new(&config.credentials_path);
    if !credentials::is_registered(path) {
        println!("System is not registered.");
        return Ok(ExitCode::SUCCESS);
    }
    match credentials::read(path) {
        Ok(handle) => {
            println!("System is registered against {}.", config.url);
            println!("System login: {}", handle.login);
        }
        Err(err) => println!("Credentials found but unreadable: {err:#}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_record(record: &RunRecord) {
    println!();
    println!("{}", Style::new().bold().apply_to("─── Run Record ───"));
    println!(
        "{}",
        serde_json::to_string_pretty(record).unwrap_or_default()
    );
}
