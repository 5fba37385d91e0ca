//! Transaction records consumed from the SpendX export format.
//!
//! Amounts are signed: negative values are expenses, positive values are
//! income. The `converted_*` fields are transient annotations produced by
//! the reconciliation routine and are never read from or written back to
//! storage.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub location: Option<String>,

    /// Amount expressed in the reconciliation base currency.
    #[serde(skip)]
    pub converted_amount: Option<f64>,
    /// Base currency of `converted_amount`, when it differs from `currency`.
    #[serde(skip)]
    pub base_currency: Option<String>,
    /// Rate applied to produce `converted_amount`.
    #[serde(skip)]
    pub exchange_rate: Option<f64>,
}

impl Transaction {
    /// The currency-consistent amount every aggregation must read: the
    /// converted value when present, the raw amount otherwise.
    pub fn effective_amount(&self) -> f64 {
        self.converted_amount.unwrap_or(self.amount)
    }

    pub fn is_expense(&self) -> bool {
        self.effective_amount() < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.effective_amount() > 0.0
    }
}

/// Loads transactions from a JSON array file.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let data = fs::read_to_string(path.as_ref()).with_context(|| {
        format!(
            "Failed to read transactions file: {}",
            path.as_ref().display()
        )
    })?;
    let transactions: Vec<Transaction> = serde_json::from_str(&data).with_context(|| {
        format!(
            "Failed to parse transactions file: {}",
            path.as_ref().display()
        )
    })?;
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"[
            {
                "amount": -42.5,
                "currency": "EUR",
                "category": "Food",
                "date": "2025-03-14T12:30:00+01:00",
                "location": "Lisbon"
            },
            {
                "amount": 2500.0,
                "currency": "USD",
                "category": "Salary",
                "date": "2025-03-01T09:00:00Z"
            }
        ]"#;

        let transactions: Vec<Transaction> = serde_json::from_str(json).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].amount, -42.5);
        assert_eq!(transactions[0].currency, "EUR");
        assert_eq!(transactions[0].location.as_deref(), Some("Lisbon"));
        assert!(transactions[0].converted_amount.is_none());
        assert_eq!(transactions[1].category, "Salary");
        assert!(transactions[1].location.is_none());
    }

    #[test]
    fn test_annotations_are_not_serialized() {
        let json = r#"{
            "amount": -10.0,
            "currency": "EUR",
            "category": "Transport",
            "date": "2025-03-14T08:00:00Z"
        }"#;
        let mut tx: Transaction = serde_json::from_str(json).unwrap();
        tx.converted_amount = Some(-10.9);
        tx.base_currency = Some("USD".to_string());
        tx.exchange_rate = Some(1.09);

        let out = serde_json::to_string(&tx).unwrap();
        assert!(!out.contains("convertedAmount"));
        assert!(!out.contains("baseCurrency"));
        assert!(!out.contains("exchangeRate"));
    }

    #[test]
    fn test_effective_amount_prefers_converted() {
        let json = r#"{
            "amount": -10.0,
            "currency": "EUR",
            "category": "Transport",
            "date": "2025-03-14T08:00:00Z"
        }"#;
        let mut tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.effective_amount(), -10.0);

        tx.converted_amount = Some(-10.9);
        assert_eq!(tx.effective_amount(), -10.9);
        assert!(tx.is_expense());
        assert!(!tx.is_income());
    }
}
