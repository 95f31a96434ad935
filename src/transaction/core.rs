//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql, params_from_iter,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryName, database_id::TransactionId, owner::OwnerId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// The kind carries the sign of a transaction, amounts themselves are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, adds to the balance.
    Income,
    /// Money spent, subtracts from the balance.
    Expense,
}

impl TransactionKind {
    /// The lowercase name used in queries and the database, e.g. "income".
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Apply the sign of this kind to a non-negative `amount`.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(Error::InvalidTransactionKind(s.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The owner the transaction belongs to.
    pub owner_id: OwnerId,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The category label, e.g. "Groceries".
    pub category: CategoryName,
    /// The non-negative amount of money, the sign is given by `kind`.
    pub amount: f64,
    /// An optional note about what the transaction was for.
    pub description: Option<String>,
    /// The day the transaction happened.
    pub occurred_on: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionKind,
        amount: f64,
        occurred_on: Date,
        category: CategoryName,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            occurred_on,
            category,
            description: None,
        }
    }

    /// The amount with the sign of the transaction's kind applied.
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }
}

/// A builder for creating and updating [Transaction] instances.
///
/// The builder is validated when it is written to the store, see [create_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,

    /// The monetary amount of the transaction.
    ///
    /// Must be positive when written to the store, the sign comes from `kind`.
    ///
    /// # Examples
    /// - `150.00` of kind income - Salary deposit
    /// - `45.99` of kind expense - Coffee shop purchase
    pub amount: f64,

    /// The day the transaction happened.
    pub occurred_on: Date,

    /// The category label of the transaction.
    pub category: CategoryName,

    /// An optional note. Blank descriptions are stored as `None`.
    pub description: Option<String>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|text| !text.trim().is_empty());
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.amount.is_finite() && self.amount > 0.0 {
            Ok(())
        } else {
            Err(Error::NonPositiveAmount(self.amount))
        }
    }
}

/// Optional filters for listing transactions.
///
/// The default query matches every transaction of the owner.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions on or after this date.
    pub from: Option<Date>,
    /// Only include transactions on or before this date.
    pub to: Option<Date>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Only include transactions with exactly this category label.
    pub category: Option<String>,
}

impl TransactionQuery {
    /// A query for all transactions within `date_range`.
    pub fn between(date_range: RangeInclusive<Date>) -> Self {
        Self {
            from: Some(*date_range.start()),
            to: Some(*date_range.end()),
            ..Default::default()
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, owner_id, kind, category, amount, description, occurred_on";

/// Create a new transaction for `owner_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero, negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner_id: OwnerId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (owner_id, kind, category, amount, description, occurred_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                owner_id.as_i64(),
                builder.kind,
                builder.category.as_ref(),
                builder.amount,
                builder.description,
                builder.occurred_on,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction of `owner_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of the owner,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    owner_id: OwnerId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2"
        ))?
        .query_row((id, owner_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Replace the fields of the transaction `id` of `owner_id` with those in `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero, negative or not finite,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction of the owner,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    owner_id: OwnerId,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET kind = ?1, category = ?2, amount = ?3, description = ?4, occurred_on = ?5
             WHERE id = ?6 AND owner_id = ?7
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.kind,
                builder.category.as_ref(),
                builder.amount,
                builder.description,
                builder.occurred_on,
                id,
                owner_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction `id` of `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction of the owner,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    owner_id: OwnerId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the transactions of `owner_id` that match `query`, oldest first.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query preparation or execution fails.
pub fn query_transactions(
    owner_id: OwnerId,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE owner_id = ?");
    let mut params = vec![Value::Integer(owner_id.as_i64())];

    if let Some(from) = query.from {
        sql.push_str(" AND occurred_on >= ?");
        params.push(Value::Text(from.to_string()));
    }

    if let Some(to) = query.to {
        sql.push_str(" AND occurred_on <= ?");
        params.push(Value::Text(to.to_string()));
    }

    if let Some(kind) = query.kind {
        sql.push_str(" AND kind = ?");
        params.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(category) = &query.category {
        sql.push_str(" AND category = ?");
        params.push(Value::Text(category.clone()));
    }

    sql.push_str(" ORDER BY occurred_on ASC, id ASC");

    let mut stmt = connection.prepare(&sql)?;
    stmt.query_map(params_from_iter(params), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            category TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            description TEXT,
            occurred_on TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_owner_date
            ON \"transaction\"(owner_id, occurred_on);",
    )
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category: String = row.get(3)?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get(1)?),
        kind: row.get(2)?,
        category: CategoryName::new_unchecked(&raw_category),
        amount: row.get(4)?,
        description: row.get(5)?,
        occurred_on: row.get(6)?,
    })
}

/// Build an in-memory transaction for tests of code that does not touch the database.
#[cfg(test)]
pub(crate) fn test_transaction(
    kind: TransactionKind,
    amount: f64,
    occurred_on: Date,
    category: &str,
) -> Transaction {
    Transaction {
        id: 0,
        owner_id: OwnerId::new(1),
        kind,
        category: CategoryName::new_unchecked(category),
        amount,
        description: None,
        occurred_on,
    }
}

// ============================================================================
// TESTS
// ============================================================================
