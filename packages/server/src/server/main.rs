// Main entry point for the check-in API server

use std::sync::Arc;

use anyhow::{Context, Result};
use firestore::{FirestoreClient, FirestoreOptions};
use server_core::domains::auth::JwtService;
use server_core::kernel::{FirestoreMemberStore, GoogleIdentityGateway, ServerDeps};
use server_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Doorlist check-in API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Wire up the member store and identity gateway
    let client = FirestoreClient::new(FirestoreOptions {
        project_id: config.firestore_project_id.clone(),
        api_key: config.firestore_api_key.clone(),
        auth_token: config.firestore_auth_token.clone(),
    });
    let member_store = Arc::new(FirestoreMemberStore::new(
        client,
        config.members_collection.clone(),
    ));
    let identity = Arc::new(GoogleIdentityGateway::new(
        config.google_client_id.clone(),
        None,
    ));
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    let deps = ServerDeps::new(member_store, identity, jwt_service);

    // Build application
    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
