//! Database initialization for the application's SQLite database.

use rusqlite::Connection;

use crate::{category::create_category_table, transaction::create_transaction_table};

/// Create all the tables and indexes used by the application.
///
/// Running this on an already initialized database is a no-op.
///
/// # Errors
/// Returns an error if a table cannot be created or there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = connection.unchecked_transaction()?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
