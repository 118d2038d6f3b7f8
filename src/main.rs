//! Server binary.
//!
//! Wires up:
//! - Cloudinary ingestion adapter (disabled with a warning when credentials are missing)
//! - PostgreSQL video store
//! - JWT identity resolution behind the access gate
//! - axum HTTP router

use cloudshelf::adapters::cloudinary::{CloudinaryClient, DeliveryUrls};
use cloudshelf::adapters::identity::{AnonymousResolver, JwtIdentityResolver};
use cloudshelf::adapters::postgres::PostgresVideoRepository;
use cloudshelf::application::library::LibraryService;
use cloudshelf::application::upload::UploadService;
use cloudshelf::http::gate::{AccessPolicy, GateState};
use cloudshelf::http::{self, AppState};
use cloudshelf::ports::identity::IdentityResolver;
use cloudshelf::AppConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cloudshelf=info,tower_http=info")),
        )
        .init();

    // 1. Adapters
    let (ingestion, delivery) = match config.media.credentials() {
        Ok(credentials) => {
            let delivery = DeliveryUrls::new(&config.media.delivery_base, &credentials.cloud_name);
            let client = CloudinaryClient::new(credentials.clone(), &config.media)?;
            tracing::info!(cloud = %credentials.cloud_name, "media service configured");
            (Some(client), Some(Arc::new(delivery)))
        }
        Err(err) => {
            tracing::warn!(error = %err, "uploads will fail until media credentials are set");
            (None, None)
        }
    };

    let repository = Arc::new(
        PostgresVideoRepository::connect(config.database_url()?, config.database_max_connections)
            .await?,
    );

    let identity: Arc<dyn IdentityResolver> = match JwtIdentityResolver::from_config(&config.identity)? {
        Some(resolver) => Arc::new(resolver),
        None => {
            tracing::warn!("no identity key configured, every request is anonymous");
            Arc::new(AnonymousResolver)
        }
    };

    // 2. Application services
    let state = AppState {
        uploads: Arc::new(UploadService::new(ingestion, repository.clone())),
        library: Arc::new(LibraryService::new(repository)),
        delivery,
        max_upload_bytes: config.max_upload_bytes,
    };
    let gate = GateState {
        identity,
        policy: AccessPolicy::new(config.identity.sign_in_url.clone()),
    };

    // 3. Start server
    let app = http::router(state, gate);
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port)).await?;
    tracing::info!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
