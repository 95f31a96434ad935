//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    aggregation::{PeriodPoint, RangeMode, aggregate_periods},
    dashboard::charts::cashflow_chart,
    locale::Language,
    owner::OwnerId,
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The language used when the request does not ask for one.
    pub default_language: Language,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            default_language: state.default_language,
        }
    }
}

/// Query parameters for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The time range to show, defaults to the last seven days.
    pub range: Option<RangeMode>,
    /// The language for labels, defaults to the server's language.
    pub lang: Option<Language>,
}

/// The dashboard series for one owner.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    /// The selected time range.
    pub range: RangeMode,
    /// The language of the labels.
    pub language: Language,
    /// The date the series ends on.
    pub today: Date,
    /// The localized heading for the range.
    pub title: &'static str,
    /// The buckets, oldest first.
    pub points: Vec<PeriodPoint>,
    /// Total income across the buckets.
    pub income: f64,
    /// Total expenses across the buckets.
    pub expense: f64,
    /// `income - expense`.
    pub net: f64,
    /// ECharts options for the cashflow chart.
    pub chart: String,
    /// Set when the transactions could not be loaded and the view is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A route handler for the dashboard series of the requesting owner.
///
/// If the transactions cannot be loaded the response is an empty series with a warning instead of
/// an error, so clients can still render the dashboard.
pub async fn get_dashboard(
    State(state): State<DashboardState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let range = query.range.unwrap_or_default();
    let language = query.lang.unwrap_or(state.default_language);

    let (transactions, warning) = match load_transactions(&state, owner_id, today) {
        Ok(transactions) => (transactions, None),
        Err(error) => {
            tracing::warn!("showing an empty dashboard for owner {owner_id}: {error}");
            (Vec::new(), Some(error.to_string()))
        }
    };

    Ok(Json(build_dashboard_view(&transactions, today, range, language, warning)).into_response())
}

fn load_transactions(
    state: &DashboardState,
    owner_id: OwnerId,
    today: Date,
) -> Result<Vec<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // Everything up to today is needed for the opening balance.
    let query = TransactionQuery {
        to: Some(today),
        ..Default::default()
    };

    query_transactions(owner_id, &query, &connection)
}

fn build_dashboard_view(
    transactions: &[Transaction],
    today: Date,
    range: RangeMode,
    language: Language,
    warning: Option<String>,
) -> DashboardView {
    let points = aggregate_periods(transactions, today, range, language);
    let income = points.iter().map(|point| point.income).sum::<f64>();
    let expense = points.iter().map(|point| point.expense).sum::<f64>();
    let chart = cashflow_chart(&points, range, language).to_string();

    DashboardView {
        range,
        language,
        today,
        title: language.range_title(range),
        points,
        income,
        expense,
        net: income - expense,
        chart,
        warning,
    }
}
