//! eLearning Platform API server

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use elearning_backend::{
    app,
    auth::{JwtHandler, UserStore},
    catalog::CatalogStore,
    AppState, Config,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    let config = Config::parse();
    info!(?config, "🚀 eLearning API starting");

    let jwt_handler: Arc<JwtHandler> = Arc::new(config.jwt_handler()?);

    let user_store = Arc::new(
        UserStore::with_cost(&config.db_path, config.bcrypt_cost)
            .context("Failed to open user store")?,
    );
    if let Some(password) = &config.admin_password {
        user_store
            .ensure_admin(&config.admin_username, password)
            .context("Failed to create bootstrap admin")?;
    }

    let catalog = Arc::new(CatalogStore::new(&config.db_path).context("Failed to open catalog")?);

    info!("🔐 Authentication initialized at: {}", config.db_path);

    let app = app(AppState {
        jwt_handler,
        user_store,
        catalog,
    });

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("🎯 API server listening on {}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with an env-driven filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elearning_backend=debug,elearning=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
