use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use futures::future::{AbortHandle, Abortable};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use crate::client::filters::AppliedFilters;
use crate::error::FieldError;
use crate::models::client_config::ClientConfig;
use crate::models::restaurant::{Coordinates, RestaurantRecord, SearchResponse};
use crate::models::search_request::SearchRequestPayload;

/// The only thing the user is told when a search fails.
pub const SEARCH_FAILED_NOTICE: &str = "Failed to fetch restaurants. Please try again.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Search rejected: {}", describe_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Server responded with {status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Bad input is never retried; a server or network hiccup may be.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Validation(_) => false,
            ClientError::Server { status, .. } => status.is_server_error(),
            ClientError::Transport(e) => !e.is_decode(),
        }
    }
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds the `POST /search` body from a term, a resolved location and the applied filters.
pub fn build_payload(
    term: &str,
    location: Coordinates,
    filters: &AppliedFilters,
) -> SearchRequestPayload {
    SearchRequestPayload {
        term: Some(term.trim().to_string()),
        location: None,
        latitude: Some(location.lat),
        longitude: Some(location.lng),
        radius: Some(filters.radius),
        price: Some(filters.price.iter().map(|&p| i64::from(p)).collect()),
        open_now: Some(filters.open_now),
        min_rating: Some(f64::from(filters.min_rating.value())),
    }
}

/// HTTP client for the restaurant finder API.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retries: 1,
        })
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub async fn search(
        &self,
        payload: &SearchRequestPayload,
    ) -> Result<Vec<RestaurantRecord>, ClientError> {
        let mut attempt = 0;
        loop {
            match self.search_once(payload).await {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    debug!("Search attempt {} failed due to: {}, retrying", attempt, e);
                }
                other => return other,
            }
        }
    }

    async fn search_once(
        &self,
        payload: &SearchRequestPayload,
    ) -> Result<Vec<RestaurantRecord>, ClientError> {
        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &body));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.restaurants)
    }

    pub async fn client_config(&self) -> Result<ClientConfig, ClientError> {
        let response = self
            .http
            .get(format!("{}/config", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &body));
        }
        Ok(response.json().await?)
    }
}

fn decode_error(status: StatusCode, body: &str) -> ClientError {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|mut value| value.get_mut("error").map(Value::take));

    match error {
        Some(Value::Array(fields)) if status == StatusCode::BAD_REQUEST => {
            let fields = fields
                .into_iter()
                .filter_map(|field| serde_json::from_value::<FieldError>(field).ok())
                .collect();
            ClientError::Validation(fields)
        }
        Some(Value::String(message)) => ClientError::Server { status, message },
        _ => ClientError::Server { status, message: body.to_string() },
    }
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// The latest search finished and replaced the displayed results.
    Updated(Vec<RestaurantRecord>),
    /// The search failed; whatever was displayed before stays on screen.
    Failed {
        notice: &'static str,
        error: ClientError,
    },
    /// A newer search was issued while this one was in flight.
    Superseded,
    /// Blank terms are never sent.
    Skipped,
}

/// Keeps displayed results in sync with the most recently issued search.
///
/// Every search takes the next sequence number and aborts whatever search was
/// in flight before it. A response is only allowed to replace the displayed
/// results if its sequence number is still the latest one when it arrives.
/// The newest search is therefore never aborted by an older one, however the
/// calls interleave across threads.
pub struct SearchSession {
    client: SearchClient,
    latest: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
    displayed: Mutex<Vec<RestaurantRecord>>,
}

impl SearchSession {
    pub fn new(client: SearchClient) -> Self {
        Self {
            client,
            latest: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            displayed: Mutex::new(Vec::new()),
        }
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    pub fn displayed(&self) -> Vec<RestaurantRecord> {
        lock(&self.displayed).clone()
    }

    pub async fn search(
        &self,
        term: &str,
        location: Coordinates,
        filters: &AppliedFilters,
    ) -> SearchOutcome {
        if term.trim().is_empty() {
            return SearchOutcome::Skipped;
        }

        let payload = build_payload(term, location, filters);
        let (sequence, registration) = {
            // Numbering and handle swap must not interleave with another search.
            let mut in_flight = lock(&self.in_flight);
            let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            let (abort_handle, registration) = AbortHandle::new_pair();
            if let Some(previous) = in_flight.replace(abort_handle) {
                previous.abort();
            }
            (sequence, registration)
        };

        let result = Abortable::new(self.client.search(&payload), registration).await;

        let mut displayed = lock(&self.displayed);
        if self.latest.load(Ordering::SeqCst) != sequence {
            debug!("Discarding response to stale search #{}", sequence);
            return SearchOutcome::Superseded;
        }

        match result {
            Err(_aborted) => SearchOutcome::Superseded,
            Ok(Ok(restaurants)) => {
                *displayed = restaurants.clone();
                SearchOutcome::Updated(restaurants)
            }
            Ok(Err(error)) => {
                warn!("Search for `{}` failed: {}", payload.term.as_deref().unwrap_or_default(), error);
                SearchOutcome::Failed {
                    notice: SEARCH_FAILED_NOTICE,
                    error,
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
