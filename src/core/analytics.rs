//! Aggregations over reconciled transactions.
//!
//! Every function here reads [`Transaction::effective_amount`], never the
//! raw amount, so results stay consistent in the reconciliation base
//! currency. Callers are expected to pass the output of
//! [`crate::core::reconcile::reconcile`].

use chrono::{NaiveDate, Timelike};
use std::collections::HashMap;
use std::fmt::Display;

use crate::core::transaction::Transaction;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialSummary {
    pub income: f64,
    /// Absolute value of all expense amounts.
    pub expenses: f64,
    pub balance: f64,
}

pub fn financial_summary(transactions: &[Transaction]) -> FinancialSummary {
    let mut summary = FinancialSummary::default();
    for tx in transactions {
        let amount = tx.effective_amount();
        if amount > 0.0 {
            summary.income += amount;
        } else {
            summary.expenses += amount.abs();
        }
    }
    summary.balance = summary.income - summary.expenses;
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    /// Share of total expenses, 0-100.
    pub percentage: f64,
}

/// Expense transactions grouped by category, largest first.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        *totals.entry(tx.category.as_str()).or_default() += tx.effective_amount().abs();
    }

    let grand_total: f64 = totals.values().sum();
    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
            percentage: if grand_total > 0.0 {
                (total / grand_total) * 100.0
            } else {
                0.0
            },
        })
        .collect();
    breakdown.sort_by(|a, b| b.total.total_cmp(&a.total));
    breakdown
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// Display label, e.g. "Mar 14".
    pub label: String,
    pub income: f64,
    pub expenses: f64,
}

/// Income and expense totals per calendar date, chronological.
pub fn daily_series(transactions: &[Transaction]) -> Vec<DailyPoint> {
    let mut days: HashMap<NaiveDate, (f64, f64)> = HashMap::new();
    for tx in transactions {
        let entry = days.entry(tx.date.date_naive()).or_default();
        let amount = tx.effective_amount();
        if amount > 0.0 {
            entry.0 += amount;
        } else {
            entry.1 += amount.abs();
        }
    }

    let mut series: Vec<DailyPoint> = days
        .into_iter()
        .map(|(date, (income, expenses))| DailyPoint {
            date,
            label: date.format("%b %-d").to_string(),
            income,
            expenses,
        })
        .collect();
    series.sort_by_key(|point| point.date);
    series
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Window for the hour of day as stored on the transaction:
    /// morning [6,12), afternoon [12,17), evening [17,21), night otherwise.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TimeOfDay::Morning => "Morning",
                TimeOfDay::Afternoon => "Afternoon",
                TimeOfDay::Evening => "Evening",
                TimeOfDay::Night => "Night",
            }
        )
    }
}

/// Expense totals per time-of-day window. All four windows are always
/// present, in fixed order.
pub fn time_of_day_breakdown(transactions: &[Transaction]) -> Vec<(TimeOfDay, f64)> {
    let mut buckets: HashMap<TimeOfDay, f64> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let window = TimeOfDay::from_hour(tx.date.hour());
        *buckets.entry(window).or_default() += tx.effective_amount().abs();
    }

    TimeOfDay::ALL
        .iter()
        .map(|window| (*window, buckets.get(window).copied().unwrap_or(0.0)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    /// "YYYY-MM"
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    /// `(income - expenses) / income * 100`, 0 when there is no income.
    pub savings_rate: f64,
}

/// Income, expenses, and savings rate per calendar month, chronological.
pub fn monthly_breakdown(transactions: &[Transaction]) -> Vec<MonthlyPoint> {
    let mut months: HashMap<String, (f64, f64)> = HashMap::new();
    for tx in transactions {
        let entry = months
            .entry(tx.date.format("%Y-%m").to_string())
            .or_default();
        let amount = tx.effective_amount();
        if amount > 0.0 {
            entry.0 += amount;
        } else {
            entry.1 += amount.abs();
        }
    }

    let mut breakdown: Vec<MonthlyPoint> = months
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyPoint {
            month,
            income,
            expenses,
            savings_rate: if income > 0.0 {
                (income - expenses) / income * 100.0
            } else {
                0.0
            },
        })
        .collect();
    breakdown.sort_by(|a, b| a.month.cmp(&b.month));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn tx_at(amount: f64, category: &str, date: &str) -> Transaction {
        let mut tx = Transaction {
            amount,
            currency: "USD".to_string(),
            category: category.to_string(),
            date: DateTime::parse_from_rfc3339(date).unwrap(),
            location: None,
            converted_amount: None,
            base_currency: None,
            exchange_rate: None,
        };
        tx.converted_amount = Some(amount);
        tx
    }

    #[test]
    fn test_financial_summary() {
        let transactions = vec![
            tx_at(200.0, "Salary", "2025-03-01T09:00:00Z"),
            tx_at(-109.0, "Food", "2025-03-02T12:00:00Z"),
        ];
        let summary = financial_summary(&transactions);
        assert_eq!(summary.income, 200.0);
        assert_eq!(summary.expenses, 109.0);
        assert_eq!(summary.balance, 91.0);
    }

    #[test]
    fn test_summary_reads_converted_amount() {
        let mut tx = tx_at(-100.0, "Food", "2025-03-02T12:00:00Z");
        tx.converted_amount = Some(-109.0);
        let summary = financial_summary(&[tx]);
        assert_eq!(summary.expenses, 109.0);
    }

    #[test]
    fn test_category_breakdown_percentages() {
        let transactions = vec![
            tx_at(-75.0, "Food", "2025-03-02T12:00:00Z"),
            tx_at(-25.0, "Transport", "2025-03-03T12:00:00Z"),
            tx_at(500.0, "Salary", "2025-03-01T09:00:00Z"),
        ];
        let breakdown = category_breakdown(&transactions);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Food");
        assert_eq!(breakdown[0].percentage, 75.0);
        assert_eq!(breakdown[1].category, "Transport");
        assert_eq!(breakdown[1].percentage, 25.0);
    }

    #[test]
    fn test_daily_series_labels_and_order() {
        let transactions = vec![
            tx_at(-30.0, "Food", "2025-03-14T12:00:00Z"),
            tx_at(100.0, "Salary", "2025-03-02T09:00:00Z"),
            tx_at(-10.0, "Food", "2025-03-02T19:00:00Z"),
        ];
        let series = daily_series(&transactions);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Mar 2");
        assert_eq!(series[0].income, 100.0);
        assert_eq!(series[0].expenses, 10.0);
        assert_eq!(series[1].label, "Mar 14");
        assert_eq!(series[1].expenses, 30.0);
    }

    #[test]
    fn test_time_of_day_windows() {
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(2), TimeOfDay::Night);
    }

    #[test]
    fn test_time_of_day_breakdown_uses_stored_offset() {
        // 08:00 in the transaction's own timezone is morning regardless of
        // the UTC instant.
        let transactions = vec![
            tx_at(-10.0, "Coffee", "2025-03-14T08:00:00+07:00"),
            tx_at(-20.0, "Dinner", "2025-03-14T19:30:00+07:00"),
            tx_at(50.0, "Refund", "2025-03-14T19:45:00+07:00"),
        ];
        let buckets = time_of_day_breakdown(&transactions);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0], (TimeOfDay::Morning, 10.0));
        assert_eq!(buckets[1], (TimeOfDay::Afternoon, 0.0));
        assert_eq!(buckets[2], (TimeOfDay::Evening, 20.0));
        assert_eq!(buckets[3], (TimeOfDay::Night, 0.0));
    }

    #[test]
    fn test_monthly_breakdown_savings_rate() {
        let transactions = vec![
            tx_at(1000.0, "Salary", "2025-02-01T09:00:00Z"),
            tx_at(-250.0, "Rent", "2025-02-03T10:00:00Z"),
            tx_at(-100.0, "Food", "2025-03-05T12:00:00Z"),
        ];
        let breakdown = monthly_breakdown(&transactions);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].month, "2025-02");
        assert_eq!(breakdown[0].savings_rate, 75.0);
        assert_eq!(breakdown[1].month, "2025-03");
        assert_eq!(breakdown[1].savings_rate, 0.0);
    }

    #[test]
    fn test_empty_input_yields_empty_collections() {
        assert_eq!(financial_summary(&[]), FinancialSummary::default());
        assert!(category_breakdown(&[]).is_empty());
        assert!(daily_series(&[]).is_empty());
        assert!(monthly_breakdown(&[]).is_empty());
        let buckets = time_of_day_breakdown(&[]);
        assert!(buckets.iter().all(|(_, total)| *total == 0.0));
    }
}
