//! HTTP route handlers.

mod results;
mod students;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use scholar_service::Message;

pub(crate) use results::{
    handle_class_results, handle_create_result, handle_delete_result, handle_get_result,
    handle_list_results, handle_recent_results, handle_recent_results_default,
    handle_statistics, handle_student_results, handle_update_result,
};
pub(crate) use students::{
    handle_create_student, handle_delete_student, handle_get_student, handle_list_students,
    handle_update_student,
};

use crate::envelope::ApiError;
use crate::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.reject(StatusCode::NOT_FOUND, Message::RouteNotFound)
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// Unwrap a JSON body, answering 400 when it does not parse.
fn body<T>(state: &AppState, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        state.reject(StatusCode::BAD_REQUEST, Message::InvalidBody)
    })
}

fn query<T>(
    state: &AppState,
    params: Result<axum::extract::Query<T>, QueryRejection>,
) -> Result<T, ApiError> {
    params
        .map(|axum::extract::Query(v)| v)
        .map_err(|rejection| {
            tracing::debug!(error = %rejection, "rejected query string");
            state.reject(StatusCode::BAD_REQUEST, Message::InvalidBody)
        })
}
