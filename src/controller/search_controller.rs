use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use crate::config::Config;
use crate::controller::AppState;
use crate::error::{SearchError, ValidationError};
use crate::models::restaurant::{RestaurantRecord, SearchResponse};
use crate::models::search_request::SearchRequestPayload;
use crate::repositories::yelp_repo::YelpRepo;

pub fn router(app_state: AppState) -> Router {
    let max_concurrent = app_state.config.max_concurrent_searches.max(1);

    Router::new()
        .route("/search", post(search_restaurants))
        .route_layer(
            ServiceBuilder::new()
                .layer(ConcurrencyLimitLayer::new(max_concurrent))
                .layer(Extension(app_state.yelp_repo))
                .layer(Extension(app_state.config))
        )
}

pub async fn search_restaurants(
    Extension(config): Extension<Arc<Config>>,
    Extension(yelp_repo): Extension<Arc<YelpRepo>>,
    payload: Result<Json<SearchRequestPayload>, JsonRejection>,
) -> impl IntoResponse {
    return match search(&config, &yelp_repo, payload).await {
        Ok(restaurants) => {
            (StatusCode::OK, Json(SearchResponse { restaurants })).into_response()
        }
        Err(e) => e.into_response(),
    };
}

/// Validation and the credential check both happen before anything leaves the process.
pub async fn search(
    config: &Config,
    yelp_repo: &YelpRepo,
    payload: Result<Json<SearchRequestPayload>, JsonRejection>,
) -> Result<Vec<RestaurantRecord>, SearchError> {
    let Json(payload) = payload.map_err(|rejection| {
        let mut errors = ValidationError::default();
        errors.push("body", rejection.body_text());
        errors
    })?;

    let request = payload.with_fallback_location().validate()?;

    let api_key = config.yelp_api_key().ok_or_else(|| {
        SearchError::Configuration("YELP_API_KEY is not set".to_string())
    })?;

    yelp_repo.search_businesses(api_key, &request).await
}
