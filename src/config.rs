use std::time::Duration;
use clap::Parser;

pub const DEFAULT_YELP_API_URL: &str = "https://api.yelp.com/v3";

#[derive(Parser, Clone, Debug)]
#[clap(name = "restaurant-finder", about = "Restaurant search proxy server")]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, default_value = "127.0.0.1")]
    pub host: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// Comma separated list of origins allowed by CORS
    #[clap(env, long, default_value = "http://localhost:5173")]
    pub origin_urls: String,

    #[clap(env, long, hide_env_values = true)]
    pub yelp_api_key: Option<String>,

    #[clap(env, long, default_value = DEFAULT_YELP_API_URL)]
    pub yelp_api_url: String,

    #[clap(env, long, hide_env_values = true)]
    pub google_maps_api_key: Option<String>,

    #[clap(env, long, default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Extra attempts made only when the provider can't be reached at all
    #[clap(env, long, default_value_t = 0)]
    pub upstream_max_retries: u32,

    #[clap(env, long, default_value_t = num_cpus::get() * 64)]
    pub max_concurrent_searches: usize,
}

impl Config {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Provider credential, treating a blank value the same as an unset one.
    pub fn yelp_api_key(&self) -> Option<&str> {
        self.yelp_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn google_maps_api_key(&self) -> &str {
        self.google_maps_api_key
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.origin_urls
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }
}
