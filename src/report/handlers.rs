//! Route handlers for period reports and their CSV export.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    aggregation::{PeriodSummary, ReportGranularity, ReportPeriod, filter_transactions, summarize},
    locale::Language,
    owner::OwnerId,
    report::export::export_transactions_csv,
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
};

/// The state needed for reports.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The language used when the request does not ask for one.
    pub default_language: Language,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            default_language: state.default_language,
        }
    }
}

/// Query parameters for reports and exports.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The length of the period, defaults to monthly.
    pub granularity: Option<ReportGranularity>,
    /// The period key, defaults to the period containing today.
    pub period: Option<String>,
    /// The language for the export header and type labels.
    pub lang: Option<Language>,
}

/// Totals and transactions for one report period.
#[derive(Debug, Serialize)]
pub struct ReportView {
    /// The length of the period.
    pub granularity: ReportGranularity,
    /// The canonical period key, e.g. "2024-03".
    pub period: String,
    /// The first day of the period.
    pub start: Date,
    /// The last day of the period.
    pub end: Date,
    /// Totals and category breakdown.
    #[serde(flatten)]
    pub summary: PeriodSummary,
    /// The transactions in the period, oldest first.
    pub transactions: Vec<Transaction>,
    /// Set when the transactions could not be loaded and the report is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A route handler for the summary of a report period.
///
/// If the transactions cannot be loaded the report is empty and carries a warning.
pub async fn get_report(
    State(state): State<ReportState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let period = resolve_period(&state, &query)?;

    let (transactions, warning) = match load_transactions(&state, owner_id, &period) {
        Ok(transactions) => (transactions, None),
        Err(error) => {
            tracing::warn!("showing an empty report for owner {owner_id}: {error}");
            (Vec::new(), Some(error.to_string()))
        }
    };

    let in_period: Vec<Transaction> = filter_transactions(&transactions, &period)
        .into_iter()
        .cloned()
        .collect();
    let date_range = period.date_range();

    let view = ReportView {
        granularity: period.granularity(),
        period: period.key(),
        start: *date_range.start(),
        end: *date_range.end(),
        summary: summarize(&in_period),
        transactions: in_period,
        warning,
    };

    Ok(Json(view).into_response())
}

/// A route handler that downloads the transactions of a report period as CSV.
///
/// Unlike the report itself, store errors are returned to the client since an empty file would
/// look like a valid export.
pub async fn export_report_endpoint(
    State(state): State<ReportState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let period = resolve_period(&state, &query)?;
    let language = query.lang.unwrap_or(state.default_language);

    let transactions = load_transactions(&state, owner_id, &period)
        .inspect_err(|error| tracing::error!("could not load transactions for export: {error}"))?;
    let csv = export_transactions_csv(&filter_transactions(&transactions, &period), language)?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"transactions-{}.csv\"",
        period.key()
    ))
    .map_err(|error| Error::ExportError(error.to_string()))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

fn resolve_period(state: &ReportState, query: &ReportQuery) -> Result<ReportPeriod, Error> {
    let granularity = query.granularity.unwrap_or_default();

    match &query.period {
        Some(key) => ReportPeriod::parse(granularity, key.trim()),
        None => Ok(ReportPeriod::containing(
            granularity,
            local_today(&state.local_timezone)?,
        )),
    }
}

fn load_transactions(
    state: &ReportState,
    owner_id: OwnerId,
    period: &ReportPeriod,
) -> Result<Vec<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    query_transactions(
        owner_id,
        &TransactionQuery::between(period.date_range()),
        &connection,
    )
}
