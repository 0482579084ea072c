//! Shared fixtures: a fake provider that records what it was asked, and helpers
//! that run the real application on an ephemeral port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::extract::Query;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::{json, Value};
use restaurant_finder::config::Config;
use restaurant_finder::controller::{application, AppState};

pub const TEST_KEY: &str = "test-key";

#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self { status: StatusCode::OK, body: value.to_string() }
    }

    pub fn error(status: StatusCode, body: &str) -> Self {
        Self { status, body: body.to_string() }
    }
}

pub struct FakeProvider {
    calls: AtomicUsize,
    queries: Mutex<Vec<Vec<(String, String)>>>,
    authorizations: Mutex<Vec<Option<String>>>,
    default_reply: Mutex<Reply>,
    replies_by_term: Mutex<HashMap<String, Reply>>,
    delays_by_term: Mutex<HashMap<String, Duration>>,
}

impl FakeProvider {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
            default_reply: Mutex::new(reply),
            replies_by_term: Mutex::new(HashMap::new()),
            delays_by_term: Mutex::new(HashMap::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<Vec<(String, String)>> {
        self.queries.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Vec<(String, String)> {
        self.queries().pop().expect("provider was never called")
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.authorizations.lock().unwrap().clone()
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.default_reply.lock().unwrap() = reply;
    }

    pub fn reply_for_term(&self, term: &str, reply: Reply) {
        self.replies_by_term.lock().unwrap().insert(term.to_string(), reply);
    }

    pub fn delay_term(&self, term: &str, delay: Duration) {
        self.delays_by_term.lock().unwrap().insert(term.to_string(), delay);
    }

    fn reply(&self, term: &str) -> Reply {
        self.replies_by_term
            .lock()
            .unwrap()
            .get(term)
            .cloned()
            .unwrap_or_else(|| self.default_reply.lock().unwrap().clone())
    }

    fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/businesses/search", get(fake_business_search))
            .layer(Extension(self.clone()))
    }

    /// Starts the provider and returns its base url.
    pub fn spawn(self: &Arc<Self>) -> String {
        format!("http://{}", spawn(self.router()))
    }

    /// Starts the provider on a specific, currently free address.
    pub fn spawn_at(self: &Arc<Self>, address: SocketAddr) {
        serve(TcpListener::bind(address).unwrap(), self.router());
    }
}

async fn fake_business_search(
    Extension(fake): Extension<Arc<FakeProvider>>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    fake.calls.fetch_add(1, Ordering::SeqCst);
    let term = query
        .iter()
        .find(|(key, _)| key == "term")
        .map(|(_, value)| value.clone())
        .unwrap_or_default();
    fake.queries.lock().unwrap().push(query);
    fake.authorizations.lock().unwrap().push(
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from),
    );

    let delay = fake.delays_by_term.lock().unwrap().get(&term).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let reply = fake.reply(&term);
    (reply.status, [(CONTENT_TYPE, "application/json")], reply.body)
}

pub fn spawn(router: Router) -> SocketAddr {
    serve(TcpListener::bind("127.0.0.1:0").unwrap(), router)
}

fn serve(listener: TcpListener, router: Router) -> SocketAddr {
    let address = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(router.into_make_service());
    tokio::spawn(server);
    address
}

/// An address nothing is listening on.
pub fn closed_address() -> SocketAddr {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap()
}

pub fn config(provider_url: &str, yelp_api_key: Option<&str>) -> Config {
    Config {
        environment: "test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        origin_urls: "http://localhost:5173".to_string(),
        yelp_api_key: yelp_api_key.map(String::from),
        yelp_api_url: provider_url.to_string(),
        google_maps_api_key: None,
        upstream_timeout_secs: 5,
        upstream_max_retries: 0,
        max_concurrent_searches: 16,
    }
}

/// Runs the full application and returns its base url.
pub fn start_app(config: Config) -> String {
    let app_state = AppState::new(config).unwrap();
    let router = application(app_state).unwrap();
    format!("http://{}", spawn(router))
}

pub fn business(id: &str, rating: f64) -> Value {
    json!({
        "id": id,
        "name": format!("{} kitchen", id),
        "image_url": format!("https://img.test/{}.jpg", id),
        "rating": rating,
        "review_count": 120,
        "price": "$$",
        "categories": [{"alias": "pizza", "title": "Pizza"}],
        "distance": 1609.34,
        "location": {"address1": "1 Main St", "city": "New York", "state": "NY"},
        "display_phone": "(212) 555-0100",
        "is_closed": false,
        "coordinates": {"latitude": 40.72, "longitude": -74.0}
    })
}

pub fn businesses(entries: Vec<Value>) -> Reply {
    Reply::json(json!({ "businesses": entries, "total": 0 }))
}
