use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::AppState;

/// Restricts the webhook to the chat platform's origin. Preflight probes are
/// answered here and never reach the handler.
pub async fn middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = state.allowed_origin.clone();

    if req.method() == Method::OPTIONS {
        debug!("answering cors preflight");
        return (
            StatusCode::NO_CONTENT,
            [
                (ACCESS_CONTROL_ALLOW_ORIGIN, origin),
                (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST")),
                (ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("3600")),
            ],
        )
            .into_response();
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    response
}
