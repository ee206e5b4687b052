//! Launchpad CLI entry point.
//!
//! Binary name: `lpad`
//!
//! Parses CLI arguments, loads configuration, restores the persisted
//! workflow session, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, TaskCommand};
use launchpad_infra::config::load_config;
use launchpad_infra::filesystem::resolve_data_dir;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "lpad", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let config = load_config(&data_dir).await;

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,launchpad=debug",
        _ => "trace",
    };
    launchpad_observe::init_tracing(config.logging.format, config.logging.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let result = dispatch(cli, &config, data_dir).await;
    launchpad_observe::shutdown_tracing();
    result
}

async fn dispatch(
    cli: Cli,
    config: &launchpad_types::config::LaunchpadConfig,
    data_dir: std::path::PathBuf,
) -> anyhow::Result<()> {
    let state = AppState::init(config, data_dir).await?;
    let json = cli.json;

    match cli.command {
        Commands::Status => cli::progress::status(&state, json)?,
        Commands::Next => cli::progress::next(&state, json)?,
        Commands::Task { action } => match action {
            TaskCommand::Set {
                section,
                task,
                status,
            } => cli::progress::set_task(&state, &section, &task, &status, json)?,
        },
        Commands::Navigate { section } => cli::progress::navigate(&state, &section, json)?,
        Commands::Reset => cli::progress::reset(&state, json)?,
        Commands::Steps => cli::run::list_steps(&state, json)?,
        Commands::Run { steps, all } => {
            cli::run::run_steps(&state, steps, all, json, cli.quiet).await?;
        }
        Commands::Content { action } => cli::content::handle(&state, action, json)?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
