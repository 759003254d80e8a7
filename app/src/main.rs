use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use todo_app::cli::CliArgs;
use todo_app::{telemetry, AppError, Shell};
use todo_core::view::TaskCache;
use todo_core::{ReqwestTransport, ResourceClient, TodoContext};
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(err) = run(CliArgs::parse()).await {
        eprintln!("todo failed: {err}");
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<(), AppError> {
    telemetry::init(&args.logging)?;

    let config = args.client_config()?;
    info!(base_url = %config.base_url, policy = ?config.invalidation, "starting");

    let transport = ReqwestTransport::new(config.timeout)?;
    let client = ResourceClient::new(&config.base_url, transport);
    let ctx = TodoContext::new(client, Arc::new(TaskCache::new()), config.invalidation);

    let mut shell = Shell::mount(&ctx);
    shell
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}
