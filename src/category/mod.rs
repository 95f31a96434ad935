//! Categories that label transactions, e.g. 'Groceries' or 'Wages'.
//!
//! This module contains:
//! - The validated [CategoryName] type shared with transactions
//! - Database functions for the owner-scoped category store
//! - Route handlers for listing and creating categories

mod core;
mod endpoints;

pub use core::{
    Category, CategoryName, create_category, create_category_table, get_categories,
};
pub use endpoints::{create_category_endpoint, list_categories_endpoint};
