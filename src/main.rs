mod admin;
mod api;
mod db;
mod error;
mod listing;
mod session;
mod state;

use anyhow::{Context, bail};
use axum::{Router, http::StatusCode, routing::get};
use clap::Parser;
use session::{AdminCredentials, SessionGuard};
use state::AppState;
use std::{path::PathBuf, sync::Arc};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ship-listings", about = "Ship listings catalog with an admin area")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// SQLite database file. Created if missing.
    #[arg(long, env = "DATABASE_PATH", default_value = "database.db")]
    database: PathBuf,

    /// Admin username.
    #[arg(long, env = "ADMIN_USERNAME")]
    admin_username: String,

    /// Admin password.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: String,
}

/// Full HTTP surface: JSON API, admin pages and health check.
pub fn app(state: AppState) -> Router {
    // CatchPanicLayer is outermost so it recovers from panics anywhere in the stack.
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .merge(api::router())
        .merge(admin::router(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ship_listings=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present (silently ignored if absent).
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if args.admin_username.is_empty() || args.admin_password.is_empty() {
        bail!("ADMIN_USERNAME and ADMIN_PASSWORD must both be non-empty");
    }

    tracing::info!("database: {}", args.database.display());
    let db = db::init_pool(&args.database).await?;

    let credentials = AdminCredentials::new(args.admin_username, args.admin_password);
    tracing::info!("Admin area enabled at /admin ({:?})", credentials);

    let state = AppState {
        db,
        guard: Arc::new(SessionGuard::new(credentials)),
    };

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("Listening on http://{addr}");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result { tracing::error!("ctrl-c error: {}", e); }
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
    tracing::info!("Shutting down gracefully");
}
