//! Exchange rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A full rate table relative to a single base currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub date: Option<NaiveDate>,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    /// Rate from the table base to `code`. The base itself always maps to 1.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        if code == self.base {
            return Some(1.0);
        }
        self.rates.get(code).copied()
    }
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("no rate known for currency: {0}")]
    UnknownCurrency(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Rate such that `amount_in_from * rate == amount_in_to`.
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;

    /// Full rate table relative to `base`.
    async fn latest_rates(&self, base: &str) -> Result<RateTable>;
}
