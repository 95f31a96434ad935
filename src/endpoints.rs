//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// Liveness probe, does not require an owner.
pub const HEALTH: &str = "/health";
/// The route to list and create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to get, update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list and create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route for the time-range series shown on the dashboard.
pub const DASHBOARD_API: &str = "/api/dashboard";
/// The route for the month calendar grid.
pub const CALENDAR_API: &str = "/api/calendar";
/// The route for a report on a single day, month or year.
pub const REPORTS_API: &str = "/api/reports";
/// The route for downloading a report's transactions as CSV.
pub const REPORT_EXPORT: &str = "/api/reports/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{transaction_id}',
/// '{transaction_id}' is the parameter.
///
/// Only the first parameter is replaced. If no parameter is found in
/// `endpoint_path`, the function returns the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
