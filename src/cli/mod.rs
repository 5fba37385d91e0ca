//! Dashboard subcommands. Each is a thin caller of the canonical
//! reconciliation and aggregation functions.

pub mod categories;
pub mod insights;
pub mod monthly;
pub mod rates;
pub mod schedule;
pub mod summary;
pub mod timeline;
pub mod ui;
