pub mod client_config;
pub mod restaurant;
pub mod search_request;
pub mod yelp;
