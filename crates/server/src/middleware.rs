//! HTTP middleware: API key authentication.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use scholar_service::Message;

use crate::state::AppState;

/// API key authentication middleware.
///
/// When a key is configured, POST, PUT and DELETE requests must include
/// either `Authorization: Bearer <key>` or `X-API-Key: <key>`. Reads are
/// public.
pub(crate) async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let expected_key = match &state.api_key {
        Some(k) => k,
        None => return next.run(request).await,
    };

    if !matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    ) {
        return next.run(request).await;
    }

    // Check Authorization: Bearer <key>
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    if let Some(auth) = auth_header {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if token == expected_key {
                return next.run(request).await;
            }
            tracing::warn!(path = %request.uri().path(), "rejected invalid bearer token");
            return state
                .reject(StatusCode::FORBIDDEN, Message::InvalidApiKey)
                .into_response();
        }
    }

    // Check X-API-Key header
    let api_key_header = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    if let Some(key) = api_key_header {
        if key == expected_key {
            return next.run(request).await;
        }
        tracing::warn!(path = %request.uri().path(), "rejected invalid api key");
        return state
            .reject(StatusCode::FORBIDDEN, Message::InvalidApiKey)
            .into_response();
    }

    state
        .reject(StatusCode::UNAUTHORIZED, Message::MissingApiKey)
        .into_response()
}
