//! The route handler for the month calendar.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Weekday;

use crate::{
    AppState, Error,
    aggregation::{CalendarMonth, DayBucket, build_calendar_grid},
    locale::Language,
    owner::OwnerId,
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// The state needed for the calendar.
#[derive(Debug, Clone)]
pub struct CalendarState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The language used when the request does not ask for one.
    pub default_language: Language,
}

impl FromRef<AppState> for CalendarState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            default_language: state.default_language,
        }
    }
}

/// Query parameters for the calendar, missing values default to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    /// The calendar year.
    pub year: Option<i32>,
    /// The zero-based month index, January = 0.
    pub month: Option<u8>,
    /// The language for labels.
    pub lang: Option<Language>,
}

/// A month laid out as six Monday-first weeks.
#[derive(Debug, Serialize)]
pub struct CalendarView<'a> {
    /// The calendar year.
    pub year: i32,
    /// The zero-based month index.
    pub month: u8,
    /// The localized abbreviated month name.
    pub month_label: &'static str,
    /// The localized column headers, Monday first.
    pub weekdays: Vec<&'static str>,
    /// The 42 cells of the grid.
    pub days: Vec<DayBucket<'a>>,
    /// Total income in the month.
    pub income: f64,
    /// Total expenses in the month.
    pub expense: f64,
    /// Set when the transactions could not be loaded and the grid is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A route handler for the calendar grid of a month.
///
/// If the transactions cannot be loaded the grid is returned without transactions and with a
/// warning.
pub async fn get_calendar(
    State(state): State<CalendarState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let month = match (query.year, query.month) {
        (Some(year), Some(month_index)) => CalendarMonth::new(year, month_index)?,
        (year, month_index) => {
            let current = CalendarMonth::containing(local_today(&state.local_timezone)?);
            CalendarMonth::new(
                year.unwrap_or(current.year()),
                month_index.unwrap_or(current.month_index()),
            )?
        }
    };
    let language = query.lang.unwrap_or(state.default_language);

    let (transactions, warning) = match load_transactions(&state, owner_id, month) {
        Ok(transactions) => (transactions, None),
        Err(error) => {
            tracing::warn!("showing an empty calendar for owner {owner_id}: {error}");
            (Vec::new(), Some(error.to_string()))
        }
    };

    let days = build_calendar_grid(month, &transactions);
    let (income, expense) = days
        .iter()
        .fold((0.0, 0.0), |(income, expense), day| {
            (income + day.income, expense + day.expense)
        });

    let view = CalendarView {
        year: month.year(),
        month: month.month_index(),
        month_label: language.month_abbrev(month.month()),
        weekdays: WEEKDAYS
            .iter()
            .map(|weekday| language.weekday_abbrev(*weekday))
            .collect(),
        days,
        income,
        expense,
        warning,
    };

    Ok(Json(view).into_response())
}

fn load_transactions(
    state: &CalendarState,
    owner_id: OwnerId,
    month: CalendarMonth,
) -> Result<Vec<Transaction>, Error> {
    let query = TransactionQuery::between(month.grid_date_range());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    query_transactions(owner_id, &query, &connection)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        middleware,
        routing::get,
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        category::CategoryName,
        db::initialize,
        locale::Language,
        owner::{OWNER_ID_HEADER, OwnerId, owner_guard},
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::{CalendarState, get_calendar};

    fn get_test_state() -> CalendarState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        for (kind, amount, date) in [
            (TransactionKind::Income, 100.0, date!(2024 - 06 - 10)),
            (TransactionKind::Expense, 40.0, date!(2024 - 06 - 10)),
            (TransactionKind::Expense, 12.0, date!(2024 - 05 - 31)),
        ] {
            create_transaction(
                OwnerId::new(1),
                Transaction::build(kind, amount, date, CategoryName::new_unchecked("Misc")),
                &connection,
            )
            .unwrap();
        }

        CalendarState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            default_language: Language::English,
        }
    }

    fn get_test_server(state: CalendarState) -> TestServer {
        let app = Router::new()
            .route("/calendar", get(get_calendar))
            .layer(middleware::from_fn(owner_guard))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn returns_forty_two_days_for_month() {
        let server = get_test_server(get_test_state());

        let response = server
            .get("/calendar")
            .add_query_param("year", 2024)
            .add_query_param("month", 5)
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("1"),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let days = body["days"].as_array().unwrap();
        assert_eq!(days.len(), 42);
        assert_eq!(days[0]["date"], "2024-05-27");
        assert_eq!(days[0]["in_focus_month"], false);
        assert_eq!(days[4]["expense"], 0.0);
        assert_eq!(body["month_label"], "Jun");
        assert_eq!(body["weekdays"][0], "Mon");
        assert_eq!(body["income"], 100.0);
        assert_eq!(body["expense"], 40.0);

        let tenth = days
            .iter()
            .find(|day| day["date"] == "2024-06-10")
            .unwrap();
        assert_eq!(tenth["transactions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_month_index_out_of_range() {
        let server = get_test_server(get_test_state());

        let response = server
            .get("/calendar")
            .add_query_param("year", 2024)
            .add_query_param("month", 12)
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("1"),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_owners_see_empty_grid() {
        let server = get_test_server(get_test_state());

        let response = server
            .get("/calendar")
            .add_query_param("year", 2024)
            .add_query_param("month", 5)
            .add_query_param("lang", "es")
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("2"),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["income"], 0.0);
        assert_eq!(body["weekdays"][0], "lun");
    }

    #[tokio::test]
    async fn rejects_month_past_last_supported_date() {
        let state = get_test_state();
        let db_connection = state.db_connection.clone();
        let server = get_test_server(state);

        let response = server
            .get("/calendar")
            .add_query_param("year", 9999)
            .add_query_param("month", 11)
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("1"),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!db_connection.is_poisoned());

        server
            .get("/calendar")
            .add_query_param("year", 2024)
            .add_query_param("month", 5)
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("1"),
            )
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn store_failure_returns_empty_view_with_warning() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE \"transaction\";")
            .unwrap();
        let server = get_test_server(state);

        let response = server
            .get("/calendar")
            .add_query_param("year", 2024)
            .add_query_param("month", 5)
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("1"),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let days = body["days"].as_array().unwrap();
        assert_eq!(days.len(), 42);
        assert!(
            days.iter()
                .all(|day| day["income"] == 0.0 && day["expense"] == 0.0)
        );
        assert_eq!(body["income"], 0.0);
        assert_eq!(body["expense"], 0.0);
        assert!(body["warning"].is_string());
    }
}
