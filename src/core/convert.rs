//! Conversion entry points over the provider stack.
//!
//! Callers converting many amounts in one currency should fetch the rate
//! once via [`ConversionService::rate`] instead of converting amount by
//! amount.

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::core::rates::{RateProvider, RateTable};

#[derive(Clone)]
pub struct ConversionService {
    provider: Arc<dyn RateProvider>,
}

impl ConversionService {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        ConversionService { provider }
    }

    /// Rate such that `amount_in_from * rate == amount_in_to`. Identity
    /// pairs resolve to 1 without touching the provider stack.
    pub async fn rate(&self, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(1.0);
        }
        self.provider.get_rate(from, to).await
    }

    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(amount);
        }
        let rate = self.provider.get_rate(from, to).await?;
        debug!("Converted {amount} {from} -> {to} at rate {rate}");
        Ok(amount * rate)
    }

    pub async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        self.provider.latest_rates(base).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedRateProvider {
        rates: HashMap<String, f64>,
    }

    impl FixedRateProvider {
        fn new(rates: &[(&str, &str, f64)]) -> Self {
            FixedRateProvider {
                rates: rates
                    .iter()
                    .map(|(from, to, rate)| (format!("{from}-{to}"), *rate))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl RateProvider for FixedRateProvider {
        async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
            self.rates
                .get(&format!("{from}-{to}"))
                .copied()
                .ok_or_else(|| anyhow!("no rate for {from}-{to}"))
        }

        async fn latest_rates(&self, base: &str) -> Result<RateTable> {
            Err(anyhow!("no table for {base}"))
        }
    }

    #[tokio::test]
    async fn test_identity_pair_is_free() {
        let service = ConversionService::new(Arc::new(FixedRateProvider::new(&[])));
        assert_eq!(service.rate("USD", "USD").await.unwrap(), 1.0);
        assert_eq!(service.convert(42.0, "EUR", "EUR").await.unwrap(), 42.0);
    }

    #[tokio::test]
    async fn test_convert_applies_rate() {
        let service = ConversionService::new(Arc::new(FixedRateProvider::new(&[(
            "EUR", "USD", 1.09,
        )])));
        let converted = service.convert(-100.0, "EUR", "USD").await.unwrap();
        assert!((converted - -109.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_pair_surfaces_error() {
        let service = ConversionService::new(Arc::new(FixedRateProvider::new(&[])));
        assert!(service.rate("EUR", "USD").await.is_err());
    }
}
