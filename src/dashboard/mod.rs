//! Dashboard module
//!
//! Serves the income, expense and running balance series for the selected time range, along with
//! chart options for rendering them.

mod charts;
mod handlers;

pub use handlers::get_dashboard;
