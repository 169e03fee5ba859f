mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use fetchbox::config::{Config, Environment};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load()?;
    let cli = Cli::parse();

    let service = match &cli.command {
        Commands::Gateway(_) => "gateway",
        Commands::Scraper => "scraper",
        Commands::Loader => "loader",
    };
    let _log_guard = init_logging(&config, service);

    match cli.command {
        Commands::Gateway(args) => {
            let address = args.address.unwrap_or(config.server.bind_addr);
            fetchbox::gateway::run(address, config).await?;
        }
        Commands::Scraper => {
            fetchbox::scraper::run(config).await?;
        }
        Commands::Loader => {
            fetchbox::loader::run(config).await?;
        }
    }

    Ok(())
}

/// `dev` logs to stdout with the compact formatter; `prod` writes to a
/// rolling file under `/app/logs/<service>.log` via a non-blocking writer.
/// Returns the guard that must stay alive for the non-blocking writer to flush.
fn init_logging(config: &Config, service: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_level = match config.environment {
        Environment::Dev => "debug",
        Environment::Prod => "info",
    };
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    match config.environment {
        Environment::Dev => {
            tracing_subscriber::fmt().with_env_filter(filter).compact().init();
            None
        }
        Environment::Prod => {
            let file_appender = tracing_appender::rolling::never("/app/logs", format!("{service}.log"));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .init();
            Some(guard)
        }
    }
}
