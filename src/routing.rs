//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState,
    calendar_endpoint::get_calendar,
    category::{create_category_endpoint, list_categories_endpoint},
    dashboard::get_dashboard,
    endpoints,
    owner::owner_guard,
    report::{export_report_endpoint, get_report},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES_API,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::DASHBOARD_API, get(get_dashboard))
        .route(endpoints::CALENDAR_API, get(get_calendar))
        .route(endpoints::REPORTS_API, get(get_report))
        .route(endpoints::REPORT_EXPORT, get(export_report_endpoint))
        .layer(middleware::from_fn(owner_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
        .into_response()
}
