//! Owner identity and the middleware that scopes every API request to one owner.
//!
//! Authentication happens upstream. The authenticating proxy forwards the
//! owner's ID in the [OWNER_ID_HEADER] header and this module only checks that
//! it is present and well formed.

use std::fmt::Display;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The header carrying the authenticated owner's ID.
pub const OWNER_ID_HEADER: &str = "x-owner-id";

/// A newtype wrapper for integer owner IDs.
///
/// This helps disambiguate owner IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Create a new owner ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the owner ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware that reads the owner ID header and places an [OwnerId] into the request.
///
/// Requests without a valid owner ID are rejected with [Error::MissingOwner].
///
/// **Note**: Route handlers can use the function argument `Extension(owner_id): Extension<OwnerId>` to receive the owner ID.
pub async fn owner_guard(mut request: Request, next: Next) -> Response {
    let owner_id = request
        .headers()
        .get(OWNER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(OwnerId::new);

    match owner_id {
        Some(owner_id) => {
            request.extensions_mut().insert(owner_id);
            next.run(request).await
        }
        None => {
            tracing::warn!(
                "Rejected request to {} without a valid {OWNER_ID_HEADER} header",
                request.uri()
            );
            Error::MissingOwner.into_response()
        }
    }
}

#[cfg(test)]
mod owner_guard_tests {
    use axum::{
        Extension, Router,
        http::{HeaderName, HeaderValue, StatusCode},
        middleware,
        routing::get,
    };
    use axum_test::TestServer;

    use super::{OWNER_ID_HEADER, OwnerId, owner_guard};

    async fn echo_owner(Extension(owner_id): Extension<OwnerId>) -> String {
        owner_id.to_string()
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/protected", get(echo_owner))
            .layer(middleware::from_fn(owner_guard));

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn passes_owner_id_to_handler() {
        let server = get_test_server();

        let response = server
            .get("/protected")
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("42"),
            )
            .await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let server = get_test_server();

        server
            .get("/protected")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_malformed_header() {
        let server = get_test_server();

        server
            .get("/protected")
            .add_header(
                HeaderName::from_static(OWNER_ID_HEADER),
                HeaderValue::from_static("not-a-number"),
            )
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
