use anyhow::Context;
use seatline_api::{app, AppState, AuthConfig};
use seatline_core::BcryptHasher;
use seatline_store::{app_config::Config, DbClient, Repositories};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatline_api=debug,seatline_core=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Seatline API on port {}", config.server.port);

    if config.auth.uses_default_secret() {
        tracing::warn!("auth.jwt_secret is the checked-in default; set SEATLINE__AUTH__JWT_SECRET before deploying");
    }

    let repos = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Repositories::postgres(&db)
        }
        None => {
            tracing::warn!("No database.url configured; using the in-memory store. Data will not survive a restart.");
            Repositories::in_memory()
        }
    };

    let app_state = AppState::new(
        repos,
        Arc::new(BcryptHasher::new(config.auth.bcrypt_cost)),
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
