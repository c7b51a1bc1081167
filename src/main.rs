use anyhow::Context;
use clap::Parser;
use labctl::adapter::inbound::cli::command::Cli;
use labctl::adapter::inbound::cli::run;
use labctl::error::Error;
use labctl::infrastructure::config::Config;
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = try_main(&cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

async fn try_main(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    config.init_logging();

    run::execute(cli, &config).await.map_err(|e| {
        error!(error = %e, "Command failed");
        anyhow::Error::new(e)
    })
}

/// Config problems exit with 2, lifecycle conflicts with 3, anything else 1.
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<Error>() {
        Some(Error::Config(_)) => 2,
        Some(Error::Lifecycle(err)) if err.http_status() == 409 => 3,
        _ => 1,
    }
}
