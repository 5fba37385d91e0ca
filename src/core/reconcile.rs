//! The canonical multi-currency reconciliation routine.
//!
//! Every display surface goes through this one function; there are no
//! per-page variants. The routine never fails: transactions whose currency
//! cannot be resolved keep their raw amount as the converted amount.

use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::core::convert::ConversionService;
use crate::core::transaction::Transaction;

/// Annotates every transaction with `converted_amount` in `base_currency`.
///
/// Output preserves input length and order. Rates for the distinct foreign
/// currencies are resolved concurrently; one currency failing to resolve
/// degrades that currency's transactions to identity conversion without
/// affecting the rest.
pub async fn reconcile(
    transactions: &[Transaction],
    base_currency: &str,
    converter: &ConversionService,
) -> Vec<Transaction> {
    let foreign: BTreeSet<&str> = transactions
        .iter()
        .map(|tx| tx.currency.as_str())
        .filter(|currency| *currency != base_currency)
        .collect();

    if foreign.is_empty() {
        return transactions
            .iter()
            .map(|tx| annotate_identity(tx.clone()))
            .collect();
    }

    debug!(
        "Resolving {} currencies against {}",
        foreign.len(),
        base_currency
    );
    let lookups = foreign.iter().map(|currency| async move {
        (*currency, converter.rate(currency, base_currency).await)
    });

    let mut rates: HashMap<&str, f64> = HashMap::new();
    for (currency, result) in join_all(lookups).await {
        match result {
            Ok(rate) => {
                rates.insert(currency, rate);
            }
            Err(e) => {
                warn!("Keeping {currency} amounts unconverted: {e}");
            }
        }
    }

    transactions
        .iter()
        .map(|tx| {
            if tx.currency == base_currency {
                return annotate_identity(tx.clone());
            }
            match rates.get(tx.currency.as_str()) {
                Some(rate) => {
                    let mut tx = tx.clone();
                    tx.converted_amount = Some(tx.amount * rate);
                    tx.base_currency = Some(base_currency.to_string());
                    tx.exchange_rate = Some(*rate);
                    tx
                }
                None => annotate_identity(tx.clone()),
            }
        })
        .collect()
}

fn annotate_identity(mut tx: Transaction) -> Transaction {
    tx.converted_amount = Some(tx.amount);
    tx.base_currency = None;
    tx.exchange_rate = None;
    tx
}
