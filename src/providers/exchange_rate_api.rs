//! Primary remote rate source, speaking the `/latest/{base}` rate-table
//! dialect used by exchangerate-api style services.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::rates::{RateProvider, RateTable};
use crate::providers::util::http_client;

pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.to_string(),
            api_key,
        }
    }

    async fn fetch_latest(&self, base: &str) -> Result<LatestRatesResponse> {
        let mut url = format!("{}/latest/{}", self.base_url, base);
        if let Some(key) = &self.api_key {
            url.push_str(&format!("?apikey={key}"));
        }
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

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rate table for {}: {}", base, e))?;

        if !data.success.unwrap_or(true) {
            return Err(anyhow!("Rate service reported failure for base: {}", base));
        }
        Ok(data)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    rates: HashMap<String, f64>,
    #[serde(default)]
    success: Option<bool>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "PrimaryRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(1.0);
        }
        let data = self.fetch_latest(from).await?;
        data.rates
            .get(to)
            .copied()
            .ok_or_else(|| anyhow!("No rate for {} in table with base {}", to, from))
    }

    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        let data = self.fetch_latest(base).await?;
        Ok(RateTable {
            base: data.base,
            date: data.date,
            rates: data.rates,
        })
    }
}
