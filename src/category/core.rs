//! Defines the category domain types and the database queries for the category store.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, database_id::CategoryId, owner::OwnerId, transaction::TransactionKind,
};

// ============================================================================
// MODELS
// ============================================================================

/// A validated, non-blank category label.
///
/// Labels are case-sensitive and kept exactly as entered, so "Food" and
/// "food" are different categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not blank.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl TryFrom<String> for CategoryName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CategoryName::new(&value)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A category for expenses or income, e.g., 'Groceries', 'Eating Out', 'Wages'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The owner the category belongs to.
    pub owner_id: OwnerId,
    /// The display label of the category.
    pub name: CategoryName,
    /// Whether the category is offered for income or expenses.
    pub kind: TransactionKind,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a category for `owner_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if the owner already has a category with the same name and kind,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    owner_id: OwnerId,
    name: CategoryName,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (owner_id, name, kind) VALUES (?1, ?2, ?3);",
            (owner_id.as_i64(), name.as_ref(), kind),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategory(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        owner_id,
        name,
        kind,
    })
}

/// Retrieve the categories of `owner_id` ordered alphabetically by name.
///
/// If `kind` is given, only categories of that kind are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_categories(
    owner_id: OwnerId,
    kind: Option<TransactionKind>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let mut stmt = connection.prepare(
        "SELECT id, owner_id, name, kind FROM category
         WHERE owner_id = ?1 AND (?2 IS NULL OR kind = ?2)
         ORDER BY name ASC, kind ASC;",
    )?;

    stmt.query_map((owner_id.as_i64(), kind), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Initialize the category table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            UNIQUE(owner_id, name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_owner_kind ON category(owner_id, kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let owner_id = OwnerId::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let kind = row.get(3)?;

    Ok(Category {
        id,
        owner_id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(CategoryName::new("\n\t \r"), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_keeps_label_as_entered() {
        let name = CategoryName::new(" Food ").unwrap();

        assert_eq!(name.as_ref(), " Food ");
    }

    #[test]
    fn deserialize_rejects_blank_name() {
        let result = serde_json::from_str::<CategoryName>("\"  \"");

        assert!(result.is_err());
    }
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{CategoryName, create_category, get_categories},
        db::initialize,
        owner::OwnerId,
        transaction::TransactionKind,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();
        let name = CategoryName::new_unchecked("Groceries");

        let category = create_category(
            OwnerId::new(1),
            name.clone(),
            TransactionKind::Expense,
            &connection,
        )
        .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.kind, TransactionKind::Expense);
    }

    #[test]
    fn create_duplicate_category_fails() {
        let connection = get_test_connection();
        let owner_id = OwnerId::new(1);
        let name = CategoryName::new_unchecked("Groceries");
        create_category(owner_id, name.clone(), TransactionKind::Expense, &connection).unwrap();

        let result = create_category(owner_id, name, TransactionKind::Expense, &connection);

        assert_eq!(result, Err(Error::DuplicateCategory("Groceries".to_owned())));
    }

    #[test]
    fn same_name_is_allowed_for_both_kinds() {
        let connection = get_test_connection();
        let owner_id = OwnerId::new(1);
        let name = CategoryName::new_unchecked("Other");

        create_category(owner_id, name.clone(), TransactionKind::Expense, &connection).unwrap();
        let result = create_category(owner_id, name, TransactionKind::Income, &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_categories_filters_by_owner_and_kind() {
        let connection = get_test_connection();
        let owner_id = OwnerId::new(1);
        let wages = create_category(
            owner_id,
            CategoryName::new_unchecked("Wages"),
            TransactionKind::Income,
            &connection,
        )
        .unwrap();
        let food = create_category(
            owner_id,
            CategoryName::new_unchecked("Food"),
            TransactionKind::Expense,
            &connection,
        )
        .unwrap();
        create_category(
            OwnerId::new(2),
            CategoryName::new_unchecked("Rent"),
            TransactionKind::Expense,
            &connection,
        )
        .unwrap();

        let all = get_categories(owner_id, None, &connection).unwrap();
        let expenses = get_categories(owner_id, Some(TransactionKind::Expense), &connection).unwrap();

        assert_eq!(all, vec![food.clone(), wages]);
        assert_eq!(expenses, vec![food]);
    }
}
