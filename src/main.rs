use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use leadflow::app::{AppContext, StoreAccess};
use leadflow::cli::{Cli, Commands, ConfigAction, EntityAction, OutputOptions};
use leadflow::commands::{
    BoardMove, cmd_add, cmd_board, cmd_config_set, cmd_config_show, cmd_ls, cmd_rm, cmd_stats,
    cmd_update, print_notifications,
};
use leadflow::config::Config;
use leadflow::entity::{Lead, Property, Task};
use leadflow::error::Result;

/// Environment variable holding the log filter, e.g. `LEADFLOW_LOG=debug`.
const LOG_ENV: &str = "LEADFLOW_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let ctx = match command {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show { json } => cmd_config_show(OutputOptions { json }),
                ConfigAction::Set { key, value, json } => {
                    cmd_config_set(&key, &value, OutputOptions { json })
                }
            };
        }
        _ => AppContext::from_config(Config::load()?)?,
    };

    let result = match command {
        Commands::Leads { action } => run_entity::<Lead>(&ctx, action).await,
        Commands::Properties { action } => run_entity::<Property>(&ctx, action).await,
        Commands::Tasks { action } => run_entity::<Task>(&ctx, action).await,
        Commands::Board {
            search,
            advance,
            back,
            json,
        } => {
            let movement = advance
                .map(BoardMove::Advance)
                .or(back.map(BoardMove::Back));
            cmd_board(&ctx, search.as_deref(), movement, OutputOptions { json }).await
        }
        Commands::Stats { json } => cmd_stats(&ctx, OutputOptions { json }).await,
        Commands::Config { .. } => Ok(()),
    };

    // Failures are reported once, by the caller.
    if result.is_ok() {
        print_notifications(&ctx.notifications);
    }
    result
}

async fn run_entity<E: StoreAccess>(ctx: &AppContext, action: EntityAction) -> Result<()> {
    match action {
        EntityAction::Ls { list, json } => cmd_ls::<E>(ctx, list.into(), OutputOptions { json }).await,
        EntityAction::Add { set, json } => cmd_add::<E>(ctx, &set, OutputOptions { json }).await,
        EntityAction::Update { id, set, json } => {
            cmd_update::<E>(ctx, &id, &set, OutputOptions { json }).await
        }
        EntityAction::Rm { id, json } => cmd_rm::<E>(ctx, &id, OutputOptions { json }).await,
    }
}
