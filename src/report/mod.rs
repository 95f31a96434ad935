//! Period reports: totals and category breakdowns for a day, month or year, and a CSV export of
//! the transactions behind them.

mod export;
mod handlers;

pub use export::{UTF8_BOM, export_transactions_csv};
pub use handlers::{export_report_endpoint, get_report};
