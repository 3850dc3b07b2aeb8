//! gridsync CLI entrypoint.

use clap::Parser;

mod commands;
mod handlers;

use commands::Commands;

#[derive(Parser)]
#[command(name = "gridsync")]
#[command(author, version, about = "CI test-grid environment and build-matrix synchronizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => handlers::init()?,
        Commands::Check { config } => handlers::check(&config)?,
        Commands::Envs { config } => handlers::envs(&config).await?,
        Commands::Jobs {
            config,
            username,
            password,
        } => handlers::jobs(&config, username, password).await?,
    }

    Ok(())
}
