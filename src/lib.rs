//! Cashbook is a personal finance service for recording income and expenses.
//!
//! The library provides a JSON API backed by SQLite. Dashboards, the month calendar and period
//! reports are derived from the stored transactions on every request by the pure functions in
//! [aggregation].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub mod aggregation;
mod app_state;
mod calendar_endpoint;
mod category;
mod dashboard;
mod database_id;
mod db;
pub mod endpoints;
mod locale;
mod logging;
mod owner;
mod report;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use category::{Category, CategoryName};
pub use db::initialize as initialize_db;
pub use locale::Language;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use owner::{OWNER_ID_HEADER, OwnerId};
pub use routing::build_router;
pub use transaction::{Transaction, TransactionKind};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid owner ID header.
    #[error("missing or invalid owner ID")]
    MissingOwner,

    /// A transaction amount was zero, negative or not a finite number.
    ///
    /// Amounts are always positive, whether money was earned or spent is given by the kind.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The owner already has a category with the same name and kind.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// A string that is not "income" or "expense" was used as a transaction kind.
    #[error("\"{0}\" is not a transaction kind, expected \"income\" or \"expense\"")]
    InvalidTransactionKind(String),

    /// A report period key did not match its granularity, e.g. "2024-13" for a month.
    #[error("\"{0}\" is not a valid period key")]
    InvalidPeriodKey(String),

    /// A zero-based month index greater than 11.
    #[error("{0} is not a valid month index, expected 0 to 11")]
    InvalidMonthIndex(u8),

    /// A calendar year outside of 1 to 9999.
    #[error("{0} is not a supported year")]
    InvalidYear(i32),

    /// The start of a date range was after its end.
    #[error("the start date must not be after the end date")]
    InvalidDateRange,

    /// A language tag other than "en" or "es".
    #[error("unsupported language \"{0}\"")]
    InvalidLanguage(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Writing the CSV export failed.
    #[error("could not export transactions: {0}")]
    ExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code used when this error is sent to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingOwner => StatusCode::UNAUTHORIZED,
            Error::NonPositiveAmount(_)
            | Error::EmptyCategoryName
            | Error::InvalidTransactionKind(_)
            | Error::InvalidPeriodKey(_)
            | Error::InvalidMonthIndex(_)
            | Error::InvalidYear(_)
            | Error::InvalidDateRange
            | Error::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategory(_) => StatusCode::CONFLICT,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::InvalidTimezoneError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::ExportError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            // Details of internal errors are only meant for the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
