use std::sync::Arc;

use clap::Parser;
use nutricheck_api::{
    application::{
        http::server::http_server::{router, state},
        probe::run_probe,
    },
    args::{Args, Command, LogArgs},
};
use tracing_subscriber::EnvFilter;

fn init_logger(args: &LogArgs) {
    let filter = EnvFilter::try_new(&args.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

async fn serve(args: Arc<Args>) -> Result<(), anyhow::Error> {
    if args.auth.api_token.is_empty() {
        tracing::warn!("API_TOKEN is not set, every analysis request will answer 401");
    }

    let listener =
        tokio::net::TcpListener::bind((args.server.host.as_str(), args.server.port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let app_state = state(args);
    let router = router(app_state)?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();

    let args = Arc::new(Args::parse());
    init_logger(&args.log);

    match &args.command {
        Some(Command::Probe(probe)) => run_probe(&args, probe).await,
        Some(Command::Serve) | None => serve(args.clone()).await,
    }
}
