//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a request or response body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Some(body_bytes) = read_body(body, "request").await else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    log_body(
        &format!("Received request: {parts:#?}"),
        "request",
        &String::from_utf8_lossy(&body_bytes),
    );

    let response = next.run(Request::from_parts(parts, Body::from(body_bytes))).await;

    let (parts, body) = response.into_parts();
    let Some(body_bytes) = read_body(body, "response").await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    log_body(
        &format!("Sending response: {parts:#?}"),
        "response",
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body, kind: &str) -> Option<Bytes> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("could not read {kind} body: {error}"))
        .ok()
}

fn log_body(summary: &str, kind: &str, body: &str) {
    match body.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
        Some((cut, _)) => {
            tracing::info!("{summary}\nbody: {}...", &body[..cut]);
            tracing::debug!("Full {kind} body: {body:?}");
        }
        None => tracing::info!("{summary}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::logging_middleware;

    async fn echo(body: String) -> String {
        body
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");
        let long_body = "ñ".repeat(200);

        let response = server.post("/echo").text(long_body.clone()).await;

        response.assert_status_ok();
        response.assert_text(long_body);
    }
}
