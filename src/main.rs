use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod models;
mod query;
mod server;
mod store;

use server::auth::SessionGuard;
use server::{AppState, SystemClock};
use store::TaskStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // CLI commands run and exit; only `serve` (or no command) continues.
    if !cli::handle_cli()? {
        return Ok(());
    }

    let config = config::load_config()?;
    if config.auth.is_default() {
        warn!(
            "default credentials are active; set [auth] in {}",
            config::config_path().display()
        );
    }

    let store = TaskStore::open(&config.data_dir)?;
    let state = AppState::new(store, SessionGuard::new(config.auth.clone()), SystemClock)?;
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("listening on http://{}", config.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to install ctrl-c handler: {err}");
    }
}
