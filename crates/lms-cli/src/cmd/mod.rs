pub mod backup;
pub mod enroll;
pub mod rename;
pub mod restore;

use anyhow::Context;
use lms_core::{Config, HttpClient};

/// Load connection settings and build the API client. Fails before any
/// input is read when credentials are missing.
fn connect() -> anyhow::Result<HttpClient> {
    let config = Config::from_env()?;
    tracing::info!(base_url = %config.base_url, "using LMS API");
    HttpClient::new(config).context("failed to build HTTP client")
}
