//! Compiled-in USD-relative rates, the terminal tier of the fallback chain.
//!
//! These are snapshot rates, refreshed manually with releases. They exist so
//! a network outage degrades conversions to stale-but-plausible values
//! instead of leaving the caller without data.

use crate::core::rates::{RateError, RateProvider, RateTable};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Units of each currency per 1 USD.
pub const FALLBACK_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.77),
    ("JPY", 151.0),
    ("AUD", 1.52),
    ("CAD", 1.36),
    ("CHF", 0.88),
    ("CNY", 7.24),
    ("INR", 83.5),
    ("MXN", 17.1),
    ("BRL", 5.05),
    ("SGD", 1.34),
    ("HKD", 7.82),
    ("NZD", 1.66),
    ("SEK", 10.6),
    ("NOK", 10.9),
    ("DKK", 6.86),
    ("PLN", 3.95),
    ("THB", 36.5),
    ("IDR", 16200.0),
    ("MYR", 4.7),
    ("PHP", 57.8),
    ("VND", 25400.0),
    ("KRW", 1380.0),
    ("TRY", 32.5),
    ("AED", 3.67),
    ("ZAR", 18.4),
    ("COP", 3900.0),
    ("CRC", 505.0),
    ("GEL", 2.68),
    ("RON", 4.58),
    ("CZK", 23.2),
    ("HUF", 360.0),
    ("ILS", 3.7),
    ("EGP", 47.8),
    ("MAD", 10.1),
];

fn usd_rate(code: &str) -> Result<f64, RateError> {
    FALLBACK_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, r)| *r)
        .ok_or_else(|| RateError::UnknownCurrency(code.to_string()))
}

/// Rate source over the static table. Cross-rates between two non-USD
/// currencies go through USD. A currency missing from the table is a hard
/// error, never a silent identity rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRateProvider;

impl StaticRateProvider {
    pub fn new() -> Self {
        StaticRateProvider
    }

    pub fn cross_rate(from: &str, to: &str) -> Result<f64, RateError> {
        if from == to {
            return Ok(1.0);
        }
        if from == "USD" {
            return usd_rate(to);
        }
        if to == "USD" {
            return Ok(1.0 / usd_rate(from)?);
        }
        Ok(usd_rate(to)? / usd_rate(from)?)
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        debug!("Using static fallback rate for {from}->{to}");
        Ok(Self::cross_rate(from, to)?)
    }

    /// Synthesizes a full table re-based onto `base` by dividing every
    /// USD-relative rate by the USD-relative rate of `base`.
    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        let base_rate = usd_rate(base)?;
        let rates: HashMap<String, f64> = FALLBACK_RATES
            .iter()
            .filter(|(code, _)| *code != base)
            .map(|(code, rate)| (code.to_string(), rate / base_rate))
            .collect();
        Ok(RateTable {
            base: base.to_string(),
            date: None,
            rates,
        })
    }
}
