use crate::retry::RetryPolicy;
use std::time::Duration;

/// Environment variable consulted by [`Client::from_env`](crate::Client::from_env).
pub const API_KEY_ENV: &str = "CENSUS_API_KEY";

/// Client settings. `Default` targets the public Census API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the data API, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Total request timeout. `None` leaves a request unbounded.
    pub timeout: Option<Duration>,
    pub max_redirects: usize,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.census.gov/data".into(),
            user_agent: concat!("acs_rs/", env!("CARGO_PKG_VERSION")).into(),
            connect_timeout: Duration::from_secs(10),
            timeout: None,
            max_redirects: 5,
            retry: RetryPolicy::default(),
        }
    }
}

/// Read the API key from [`API_KEY_ENV`]; blank values count as unset.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
