//! HTTP transport seam.
//!
//! [`HttpTransport`] performs real blocking GETs. Tests plug in their own
//! [`Transport`] to script responses without a network.

use crate::config::ClientConfig;
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;

/// Issues a GET and returns the response body.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> reqwest::Result<Self> {
        let http = HttpClient::builder()
            // blocking reqwest defaults to 30s; `None` disables the total timeout
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let r = self
            .http
            .get(url)
            .send()
            .map_err(reqwest::Error::without_url)
            .context("send request")?;
        let status = r.status();
        if !status.is_success() {
            let body = r.text().unwrap_or_default();
            bail!("request failed with HTTP {}: {}", status, body.trim());
        }
        r.text().context("read response body")
    }
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<String>,
{
    fn get(&self, url: &str) -> Result<String> {
        self(url)
    }
}
