//! Primary -> secondary -> static fallback chain.
//!
//! A tier failure is absorbed and the next tier consulted; only the static
//! tier's unknown-currency error escapes to the caller. No retries within a
//! tier.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::rates::{RateProvider, RateTable};
use crate::providers::fallback::StaticRateProvider;

pub struct TieredRateProvider {
    primary: Box<dyn RateProvider>,
    secondary: Box<dyn RateProvider>,
    fallback: StaticRateProvider,
}

impl TieredRateProvider {
    pub fn new(primary: Box<dyn RateProvider>, secondary: Box<dyn RateProvider>) -> Self {
        TieredRateProvider {
            primary,
            secondary,
            fallback: StaticRateProvider::new(),
        }
    }
}

#[async_trait]
impl RateProvider for TieredRateProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(1.0);
        }
        match self.primary.get_rate(from, to).await {
            Ok(rate) => return Ok(rate),
            Err(e) => debug!("Primary rate source failed for {from}->{to}: {e}"),
        }
        match self.secondary.get_rate(from, to).await {
            Ok(rate) => return Ok(rate),
            Err(e) => warn!("Secondary rate source failed for {from}->{to}: {e}"),
        }
        self.fallback.get_rate(from, to).await
    }

    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        match self.primary.latest_rates(base).await {
            Ok(table) => return Ok(table),
            Err(e) => debug!("Primary rate source failed for table base {base}: {e}"),
        }
        match self.secondary.latest_rates(base).await {
            Ok(table) => return Ok(table),
            Err(e) => warn!("Secondary rate source failed for table base {base}: {e}"),
        }
        self.fallback.latest_rates(base).await
    }
}
