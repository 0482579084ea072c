use anyhow::Context;
use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};
use crate::config::Config;
use crate::error::SearchError;
use crate::models::restaurant::RestaurantRecord;
use crate::models::search_request::{MinRating, SearchLocation, SearchRequest};
use crate::models::yelp::YelpSearchResponse;

pub const SEARCH_LIMIT: u32 = 20;
pub const MAX_RADIUS_METERS: f64 = 40_000.0;
const RETRY_BACKOFF_MS: u64 = 250;

/// Outbound half of the search proxy: one authenticated call to the provider's
/// business search per request.
pub struct YelpRepo {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl YelpRepo {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .context("Failed to build the provider http client")?;

        Ok(Self {
            client,
            base_url: config.yelp_api_url.trim_end_matches('/').to_string(),
            max_retries: config.upstream_max_retries,
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/businesses/search", self.base_url)
    }

    pub async fn search_businesses(
        &self,
        api_key: &str,
        request: &SearchRequest,
    ) -> Result<Vec<RestaurantRecord>, SearchError> {
        let query = build_query(request);
        let response = self
            .send(api_key, &query)
            .await
            .context("Failed to reach the restaurant provider")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Upstream { status, body });
        }

        let body = response
            .text()
            .await
            .context("Failed to read the provider response body")?;
        let payload: YelpSearchResponse = serde_json::from_str(&body)
            .context("Provider returned a payload that is not a business search response")?;

        let restaurants = normalize(payload, request.min_rating);
        info!(
            "Provider search for `{}` produced {} restaurants",
            request.term,
            restaurants.len()
        );
        Ok(restaurants)
    }

    async fn send(
        &self,
        api_key: &str,
        query: &[(&'static str, String)],
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = self.search_url();
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .get(&url)
                .bearer_auth(api_key)
                .header(ACCEPT, "application/json")
                .query(query)
                .send()
                .await;

            match result {
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Provider unreachable due to: {}, retrying (attempt {} of {})",
                        e, attempt, self.max_retries
                    );
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        RETRY_BACKOFF_MS * u64::from(attempt),
                    )).await;
                }
                other => return other,
            }
        }
    }
}

/// Query string for the provider, in the order the parameters are appended.
pub fn build_query(request: &SearchRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("term", request.term.clone()),
        ("limit", SEARCH_LIMIT.to_string()),
    ];

    match &request.location {
        SearchLocation::Coordinates(coordinates) => {
            query.push(("latitude", coordinates.lat.to_string()));
            query.push(("longitude", coordinates.lng.to_string()));
        }
        SearchLocation::Place(place) => query.push(("location", place.clone())),
    }

    if let Some(radius) = request.radius {
        query.push(("radius", clamp_radius(radius).to_string()));
    }

    if !request.price.is_empty() {
        let price = request
            .price
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",");
        query.push(("price", price));
    }

    if request.open_now {
        query.push(("open_now", "true".to_string()));
    }

    query
}

/// Whole meters, at least one and capped at the provider maximum.
pub fn clamp_radius(radius: f64) -> u32 {
    radius.min(MAX_RADIUS_METERS).round().max(1.0) as u32
}

/// Applies the rating threshold the provider can't, then maps what's left.
pub fn normalize(payload: YelpSearchResponse, min_rating: MinRating) -> Vec<RestaurantRecord> {
    let businesses = payload.businesses.unwrap_or_default();
    let received = businesses.len();

    let restaurants: Vec<RestaurantRecord> = businesses
        .into_iter()
        .filter(|business| min_rating.admits(business.rating.unwrap_or(0.0)))
        .filter_map(RestaurantRecord::from_business)
        .collect();

    if restaurants.len() != received {
        debug!(
            "Kept {} of {} provider businesses (minimum rating {})",
            restaurants.len(),
            received,
            min_rating
        );
    }
    restaurants
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::models::restaurant::Coordinates;
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest {
            term: "pizza".into(),
            location: SearchLocation::Coordinates(Coordinates { lat: 40.7128, lng: -74.006 }),
            radius: None,
            price: vec![],
            open_now: false,
            min_rating: MinRating::Any,
        }
    }

    fn keys(query: &[(&'static str, String)]) -> Vec<&'static str> {
        query.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn bare_coordinate_search_has_no_optional_params() {
        let query = build_query(&request());
        assert_eq!(
            query,
            vec![
                ("term", "pizza".to_string()),
                ("limit", "20".to_string()),
                ("latitude", "40.7128".to_string()),
                ("longitude", "-74.006".to_string()),
            ]
        );
    }

    #[test]
    fn place_search_sends_location_text() {
        let query = build_query(&SearchRequest {
            location: SearchLocation::Place("New York, NY".into()),
            ..request()
        });
        assert_eq!(keys(&query), vec!["term", "limit", "location"]);
        assert_eq!(query[2].1, "New York, NY");
    }

    #[test]
    fn filters_are_appended_when_set() {
        let query = build_query(&SearchRequest {
            radius: Some(8046.7),
            price: vec![1, 2],
            open_now: true,
            ..request()
        });
        assert_eq!(
            &query[4..],
            &[
                ("radius", "8047".to_string()),
                ("price", "1,2".to_string()),
                ("open_now", "true".to_string()),
            ]
        );
    }

    #[test]
    fn radius_above_provider_maximum_is_clamped() {
        for radius in [40_000.1, 40_001.0, 80_467.2, 1e9] {
            assert_eq!(clamp_radius(radius), 40_000);
        }
        assert_eq!(clamp_radius(40_000.0), 40_000);
        assert_eq!(clamp_radius(1609.34), 1609);
    }

    #[test]
    fn tiny_positive_radius_never_becomes_zero() {
        assert_eq!(clamp_radius(0.4), 1);
        assert_eq!(clamp_radius(0.5), 1);
        assert_eq!(clamp_radius(1.6), 2);

        let query = build_query(&SearchRequest {
            radius: Some(0.4),
            ..request()
        });
        assert_eq!(query[4], ("radius", "1".to_string()));
    }

    #[test]
    fn untitled_categories_do_not_sink_the_payload() {
        let payload: YelpSearchResponse = serde_json::from_value(json!({
            "businesses": [
                {"id": "a", "categories": [{"alias": "pizza"}], "coordinates": {"latitude": 1.0, "longitude": 1.0}},
                {"id": "b", "categories": [{"alias": "thai", "title": "Thai"}], "coordinates": {"latitude": 1.0, "longitude": 1.0}}
            ]
        }))
        .unwrap();

        let restaurants = normalize(payload, MinRating::Any);
        let ids: Vec<&str> = restaurants.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(restaurants[0].cuisine.is_empty());
        assert_eq!(restaurants[1].cuisine, vec!["Thai"]);
    }

    #[test]
    fn min_rating_filter_drops_low_rated_businesses() {
        let payload: YelpSearchResponse = serde_json::from_value(json!({
            "businesses": [
                {"id": "a", "rating": 4.5, "coordinates": {"latitude": 1.0, "longitude": 1.0}},
                {"id": "b", "rating": 3.5, "coordinates": {"latitude": 1.0, "longitude": 1.0}},
                {"id": "c", "rating": 4.0, "coordinates": {"latitude": 1.0, "longitude": 1.0}},
                {"id": "d", "coordinates": {"latitude": 1.0, "longitude": 1.0}}
            ]
        }))
        .unwrap();

        let four_plus = normalize(payload.clone(), MinRating::Four);
        let ids: Vec<&str> = four_plus.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(four_plus.iter().all(|r| r.rating >= 4.0));

        assert_eq!(normalize(payload, MinRating::Any).len(), 4);
    }

    #[test]
    fn missing_business_list_is_an_empty_result() {
        let payload: YelpSearchResponse = serde_json::from_value(json!({"total": 0})).unwrap();
        assert!(normalize(payload, MinRating::Any).is_empty());
    }
}
