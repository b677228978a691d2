use clap::{Parser, Subcommand};
use std::process::ExitCode;

use rooftops::config::Config;
use rooftops::error::Result;
use rooftops::remote::AccountFilters;
use rooftops::tui::run_dashboard;

#[derive(Parser)]
#[command(name = "rooftops")]
#[command(about = "Terminal dashboard for contracted rooftop onboarding")]
#[command(version)]
struct Cli {
    /// Account service base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Accounts fetched per page (overrides config)
    #[arg(long)]
    page_size: Option<u32>,

    /// Start with a region filter applied (e.g. AMER, EMEA, APAC)
    #[arg(long)]
    region: Option<String>,

    /// Start with an account-type filter applied
    #[arg(long = "type")]
    account_type: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or change stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one config value
    Get { key: String },
    /// Set a config value and save it
    Set { key: String, value: String },
    /// Print all config values
    Show,
    /// Print the config file path
    Path,
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get_value(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set_value(&key, &value)?;
            config.save()?;
            println!("{} updated", key);
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            for key in ["api_url", "api_token", "request_timeout", "page_size"] {
                println!("{}: {}", key, config.get_value(key)?);
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Config { action }) => cmd_config(action),
        None => {
            let mut config = Config::load()?;
            if let Some(api_url) = cli.api_url {
                config.api_url = api_url;
            }
            if let Some(page_size) = cli.page_size {
                config.page_size = page_size;
            }
            let filters = AccountFilters {
                region: cli.region,
                account_type: cli.account_type,
                ..Default::default()
            };
            run_dashboard(&config, filters)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
