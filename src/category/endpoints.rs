//! Route handlers for the category store.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{CategoryName, create_category, get_categories},
    owner::OwnerId,
    transaction::TransactionKind,
};

/// The state needed to list or create categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    /// Only list categories of this kind.
    pub kind: Option<TransactionKind>,
}

/// The request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    /// The display label of the category.
    pub name: String,
    /// Whether the category is for income or expenses.
    pub kind: TransactionKind,
}

/// A route handler for listing the owner's categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(owner_id): Extension<OwnerId>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(owner_id, query.kind, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(Json(categories).into_response())
}

/// A route handler for creating a category, responds with the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(owner_id): Extension<OwnerId>,
    Json(form): Json<CategoryForm>,
) -> Result<Response, Error> {
    let name = CategoryName::new(&form.name)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(owner_id, name, form.kind, &connection)
        .inspect_err(|error| tracing::error!("could not create category: {error}"))?;

    tracing::debug!("created category {} for owner {owner_id}", category.id);

    Ok((StatusCode::CREATED, Json(category)).into_response())
}
