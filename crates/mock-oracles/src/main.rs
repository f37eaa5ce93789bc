//! Mock Oracles CLI

use clap::Parser;
use mock_oracles::cli::{Cli, CommandRunner, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 优先使用环境变量 RUST_LOG，否则使用命令行参数指定的级别
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .init();

    match cli.command {
        Commands::Server {
            port,
            seed,
            delay_ms,
        } => {
            CommandRunner::run_server(port, seed.as_deref(), delay_ms).await?;
        }
        Commands::CheckSeed { file } => {
            CommandRunner::run_check_seed(&file)?;
        }
    }

    Ok(())
}
