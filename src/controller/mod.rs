use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::repositories::yelp_repo::YelpRepo;

pub mod config_controller;
pub mod health_check;
pub mod search_controller;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub yelp_repo: Arc<YelpRepo>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let yelp_repo = YelpRepo::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            yelp_repo: Arc::new(yelp_repo),
        })
    }
}

pub async fn serve(app_state: AppState) -> anyhow::Result<()> {
    if app_state.config.yelp_api_key().is_none() {
        warn!("YELP_API_KEY is not set, every search will fail until it is configured");
    }
    if app_state.config.google_maps_api_key().is_empty() {
        warn!("GOOGLE_MAPS_API_KEY is not set, the map view will be unavailable");
    }

    let address = format!("{}:{}", app_state.config.host, app_state.config.port);
    let address: SocketAddr = address
        .parse()
        .with_context(|| format!("Invalid bind address {}", address))?;
    let application = application(app_state)?;

    info!("API server listening on: {}", address);
    axum::Server::try_bind(&address)
        .with_context(|| format!("Failed to bind {}", address))?
        .serve(application.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Error spinning up the API server")
}

/// Every route plus the cross-cutting layers, ready to be served.
pub fn application(app_state: AppState) -> anyhow::Result<Router> {
    let origins = app_state
        .config
        .origins()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {}", origin))
        })
        .collect::<anyhow::Result<Vec<HeaderValue>>>()?;

    Ok(router_endpoints(app_state)
        .fallback(page_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::OPTIONS
                        ])
                        .allow_origin(origins)
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                )
        ))
}

pub fn router_endpoints(app_state: AppState) -> Router {
    health_check::router()
        .merge(search_controller::router(app_state.clone()))
        .merge(config_controller::router(app_state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
