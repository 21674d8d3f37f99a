use std::sync::Arc;

use anyhow::Context;
use studio_quote::config::{ServerConfig, StoreConfig};
use studio_quote::quote::QuoteManager;
use studio_quote::server::build_app;
use studio_quote::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    eprintln!("🎬 Studio Quote v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Quote API: http://0.0.0.0:{}/api/quote", config.port);
    eprintln!("   Admin API: http://0.0.0.0:{}/api/admin", config.port);
    eprintln!("   Hand-off: {}", config.handoff.base_url);

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = match &config.store {
        StoreConfig::Local { path } => {
            eprintln!("   Database: {}", path.display());
            Arc::new(
                LibSqlBackend::new_local(path)
                    .await
                    .with_context(|| format!("failed to open database at {}", path.display()))?,
            )
        }
        StoreConfig::Remote { url, auth_token } => {
            eprintln!("   Database: {url} (remote)");
            Arc::new(
                LibSqlBackend::new_remote(url, auth_token)
                    .await
                    .with_context(|| format!("failed to connect to {url}"))?,
            )
        }
    };

    // ── Quote sessions ───────────────────────────────────────────────────
    let manager = Arc::new(QuoteManager::new(
        Arc::clone(&db),
        config.handoff.clone(),
        config.session_idle_timeout,
    ));

    let app = build_app(manager, db);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Quote server started");
    axum::serve(listener, app).await?;

    Ok(())
}
