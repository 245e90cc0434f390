//! Pomodoro session timer CLI
//!
//! Runs named sessions built from the Pomodoro Technique:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 15 minutes of long break
//!
//! Run `pomodoro daemon` once; every other command talks to it.

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomodoro_session::cli::{Cli, Commands, Display, IpcClient};
use pomodoro_session::config::AppConfig;
use pomodoro_session::daemon;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon => {
            let config = AppConfig::load()?;
            daemon::run(config).await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
        Commands::Init(args) => {
            let response = IpcClient::new()?.init(&args).await?;
            Display::show_session_update(&response);
        }
        Commands::Start => {
            let response = IpcClient::new()?.start().await?;
            Display::show_session_update(&response);
        }
        Commands::Pause => {
            let response = IpcClient::new()?.pause().await?;
            Display::show_session_update(&response);
        }
        Commands::Resume => {
            let response = IpcClient::new()?.resume().await?;
            Display::show_session_update(&response);
        }
        Commands::Skip => {
            let response = IpcClient::new()?.skip().await?;
            Display::show_session_update(&response);
        }
        Commands::Cycle => {
            let response = IpcClient::new()?.cycle().await?;
            Display::show_session_update(&response);
        }
        Commands::Status => {
            let response = IpcClient::new()?.status().await?;
            Display::show_status(&response);
        }
        Commands::Save => {
            let response = IpcClient::new()?.save().await?;
            Display::show_saved(&response);
        }
        Commands::Discard => {
            let response = IpcClient::new()?.discard().await?;
            Display::show_message(&response);
        }
        Commands::Sessions => {
            let response = IpcClient::new()?.sessions().await?;
            Display::show_sessions(&response);
        }
        Commands::Show { id } => {
            let response = IpcClient::new()?.show(&id).await?;
            Display::show_record(&response);
        }
        Commands::Dashboard => {
            let response = IpcClient::new()?.dashboard().await?;
            Display::show_dashboard(&response);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let response = IpcClient::new()?
                .register(&username, &email, &password)
                .await?;
            Display::show_message(&response);
        }
        Commands::Login { email, password } => {
            let response = IpcClient::new()?.login(&email, &password).await?;
            Display::show_message(&response);
        }
        Commands::Logout => {
            let response = IpcClient::new()?.logout().await?;
            Display::show_message(&response);
        }
        Commands::Whoami => {
            let response = IpcClient::new()?.whoami().await?;
            Display::show_message(&response);
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
