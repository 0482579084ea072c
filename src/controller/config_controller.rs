use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::routing::get;
use tracing::debug;
use crate::config::Config;
use crate::controller::AppState;
use crate::models::client_config::ClientConfig;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/config", get(get_client_config))
        .route_layer(Extension(app_state.config))
}

pub async fn get_client_config(
    Extension(config): Extension<Arc<Config>>,
) -> Json<ClientConfig> {
    let client_config = ClientConfig {
        google_maps_api_key: config.google_maps_api_key().to_string(),
    };
    if !client_config.map_enabled() {
        debug!("Map key not configured, clients will hide the map view");
    }
    Json(client_config)
}
