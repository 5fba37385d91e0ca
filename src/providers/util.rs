use anyhow::Result;
use std::time::Duration;

/// Remote rate lookups must never block rendering indefinitely, so every
/// provider client carries the same hard timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent("spendx/0.4")
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}
