// ABOUTME: Server binary wiring configuration, storage, connectors, and HTTP routes
// ABOUTME: Twitter connector is registered only when consumer credentials are configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tether::broker::ConnectionBroker;
use tether::cache::SessionCache;
use tether::config::BrokerConfig;
use tether::connectors::ConnectorRegistry;
use tether::crypto::SecretCipher;
use tether::database::Database;
use tether::errors::{AppError, AppResult};
use tether::oauth1::twitter::{TwitterConnector, TwitterConnectorConfig};
use tether::routes::{router, AppState};

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BrokerConfig::from_env()?;

    let cipher = SecretCipher::new(config.encryption_key.as_deref());
    let database = Arc::new(Database::new(&config.database_url, cipher).await?);

    let mut connectors = ConnectorRegistry::new();
    match &config.twitter {
        Some(twitter) => {
            let connector = TwitterConnector::new(TwitterConnectorConfig::new(
                twitter.consumer_key.clone(),
                twitter.consumer_secret.clone(),
            ))?;
            connectors.register(Arc::new(connector));
            info!("Twitter connector registered");
        }
        None => warn!("Twitter OAuth not configured; connection initiation disabled"),
    }

    let broker = Arc::new(ConnectionBroker::new(
        database,
        Arc::new(SessionCache::new()),
        connectors,
        config.callback_base_url.clone(),
    ));

    let app = router(AppState { broker });

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "Tether credential broker listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install shutdown handler");
        return;
    }
    info!("Shutdown signal received");
}
