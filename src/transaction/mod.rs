//! Transaction management for the cashbook.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the owner-scoped transaction store

mod core;
mod endpoints;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, TransactionQuery, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, query_transactions,
    update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};

#[cfg(test)]
pub(crate) use core::test_transaction;
