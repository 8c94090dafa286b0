//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence REST API with HTTP Basic
//! authentication.

mod labels;
mod pages;

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use m2c_config::ConfluenceConfig;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    api_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create client for a REST API root (e.g. `https://host/wiki/rest/api`).
    pub fn new(api_url: &str, user: &str, password: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_owned(),
            auth_header: basic_auth(user, password),
        }
    }

    /// Create client from the `[confluence]` config section.
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        Self::new(&config.api_url(), &config.user, &config.password)
    }
}

fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

/// Turn an error status into [`ConfluenceError::HttpResponse`].
fn check_status(response: Response<ureq::Body>) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader)
}
