//! Route handlers for the transaction store.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    category::CategoryName,
    database_id::TransactionId,
    owner::OwnerId,
    transaction::{
        Transaction, TransactionBuilder, TransactionKind, TransactionQuery, create_transaction,
        delete_transaction, get_transaction, query_transactions, update_transaction,
    },
};

/// The state needed for the transaction routes.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    /// Only list transactions on or after this date.
    pub from: Option<Date>,
    /// Only list transactions on or before this date.
    pub to: Option<Date>,
    /// Only list transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Only list transactions with this category label.
    pub category: Option<String>,
}

/// The request body for creating or updating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The positive amount of money.
    pub amount: f64,
    /// The day the transaction happened, e.g. "2024-06-15".
    pub occurred_on: Date,
    /// The category label.
    pub category: String,
    /// An optional note.
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionForm {
    fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let category = CategoryName::new(&self.category)?;

        Ok(
            Transaction::build(self.kind, self.amount, self.occurred_on, category)
                .description(self.description),
        )
    }
}

/// A route handler for listing the owner's transactions, oldest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Response, Error> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(Error::InvalidDateRange);
    }

    let transaction_query = TransactionQuery {
        from: query.from,
        to: query.to,
        kind: query.kind,
        category: query.category,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transactions = query_transactions(owner_id, &transaction_query, &connection)
        .inspect_err(|error| tracing::error!("could not query transactions: {error}"))?;

    Ok(Json(transactions).into_response())
}

/// A route handler for creating a new transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let builder = form.into_builder()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = create_transaction(owner_id, builder, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    tracing::debug!("created transaction {} for owner {owner_id}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = get_transaction(owner_id, transaction_id, &connection)?;

    Ok(Json(transaction).into_response())
}

/// A route handler for replacing a transaction, responds with the updated transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let builder = form.into_builder()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = update_transaction(owner_id, transaction_id, builder, &connection)
        .inspect_err(|error| {
            tracing::error!("could not update transaction {transaction_id}: {error}")
        })?;

    Ok(Json(transaction).into_response())
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(owner_id): Extension<OwnerId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    delete_transaction(owner_id, transaction_id, &connection).inspect_err(|error| {
        tracing::error!("could not delete transaction {transaction_id}: {error}")
    })?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::CategoryName,
        db::initialize,
        owner::OwnerId,
        transaction::{
            Transaction, TransactionKind, TransactionQuery, create_transaction, get_transaction,
            query_transactions,
        },
    };

    use super::{
        TransactionForm, TransactionListQuery, TransactionState, create_transaction_endpoint,
        delete_transaction_endpoint, list_transactions_endpoint, update_transaction_endpoint,
    };

    fn get_test_state() -> TransactionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn groceries_form(amount: f64) -> TransactionForm {
        TransactionForm {
            kind: TransactionKind::Expense,
            amount,
            occurred_on: date!(2024 - 06 - 15),
            category: "Groceries".to_owned(),
            description: Some("weekly shop".to_owned()),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();
        let owner_id = OwnerId::new(3);

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(owner_id),
            Json(groceries_form(42.5)),
        )
        .await
        .expect("Could not create transaction");

        assert_eq!(response.status(), StatusCode::CREATED);
        let connection = state.db_connection.lock().unwrap();
        let transactions =
            query_transactions(owner_id, &TransactionQuery::default(), &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 42.5);
        assert_eq!(transactions[0].category.as_ref(), "Groceries");
    }

    #[tokio::test]
    async fn create_rejects_zero_amount() {
        let result = create_transaction_endpoint(
            State(get_test_state()),
            Extension(OwnerId::new(3)),
            Json(groceries_form(0.0)),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NonPositiveAmount(0.0)));
    }

    #[tokio::test]
    async fn create_rejects_blank_category() {
        let mut form = groceries_form(10.0);
        form.category = " ".to_owned();

        let result =
            create_transaction_endpoint(State(get_test_state()), Extension(OwnerId::new(3)), Json(form))
                .await;

        assert_eq!(result.err(), Some(Error::EmptyCategoryName));
    }

    #[tokio::test]
    async fn list_rejects_inverted_date_range() {
        let result = list_transactions_endpoint(
            State(get_test_state()),
            Extension(OwnerId::new(3)),
            Query(TransactionListQuery {
                from: Some(date!(2024 - 02 - 01)),
                to: Some(date!(2024 - 01 - 01)),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidDateRange));
    }

    #[tokio::test]
    async fn update_changes_stored_transaction() {
        let state = get_test_state();
        let owner_id = OwnerId::new(3);
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                owner_id,
                Transaction::build(
                    TransactionKind::Expense,
                    5.0,
                    date!(2024 - 06 - 01),
                    CategoryName::new_unchecked("Coffee"),
                ),
                &connection,
            )
            .unwrap()
        };

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(owner_id),
            Path(transaction.id),
            Json(groceries_form(60.0)),
        )
        .await
        .expect("Could not update transaction");

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        let stored = get_transaction(owner_id, transaction.id, &connection).unwrap();
        assert_eq!(stored.amount, 60.0);
        assert_eq!(stored.category.as_ref(), "Groceries");
        assert_eq!(stored.occurred_on, date!(2024 - 06 - 15));
    }

    #[tokio::test]
    async fn delete_of_another_owners_transaction_fails() {
        let state = get_test_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                OwnerId::new(1),
                Transaction::build(
                    TransactionKind::Income,
                    5.0,
                    date!(2024 - 06 - 01),
                    CategoryName::new_unchecked("Gift"),
                ),
                &connection,
            )
            .unwrap()
        };

        let result = delete_transaction_endpoint(
            State(state.clone()),
            Extension(OwnerId::new(2)),
            Path(transaction.id),
        )
        .await;
        assert_eq!(result.err(), Some(Error::DeleteMissingTransaction));

        let response = delete_transaction_endpoint(
            State(state),
            Extension(OwnerId::new(1)),
            Path(transaction.id),
        )
        .await
        .expect("Could not delete transaction");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
