//! Secondary remote rate source, speaking the `api.exchangerate.host`
//! query-parameter dialect.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::rates::{RateProvider, RateTable};
use crate::providers::util::http_client;

pub struct ExchangerateHostProvider {
    base_url: String,
}

impl ExchangerateHostProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangerateHostProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    success: Option<bool>,
    result: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    success: Option<bool>,
    base: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateProvider for ExchangerateHostProvider {
    #[instrument(name = "SecondaryRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(1.0);
        }
        let url = format!(
            "{}/convert?from={}&to={}&amount=1",
            self.base_url, from, to
        );
        debug!("Requesting conversion from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {}-{}", e, from, to))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair: {}-{}",
                response.status(),
                from,
                to
            ));
        }

        let data = response.json::<ConvertResponse>().await?;
        if !data.success.unwrap_or(true) {
            return Err(anyhow!("Conversion failed for pair: {}-{}", from, to));
        }
        data.result
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| anyhow!("No conversion result for pair: {}-{}", from, to))
    }

    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/latest?base={}", self.base_url, base);
        debug!("Requesting rate table from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let data = response.json::<LatestResponse>().await?;
        if !data.success.unwrap_or(true) {
            return Err(anyhow!("Rate service reported failure for base: {}", base));
        }
        Ok(RateTable {
            base: data.base,
            date: data.date,
            rates: data.rates,
        })
    }
}
