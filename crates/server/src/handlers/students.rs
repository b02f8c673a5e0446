use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use scholar_core::{NewStudent, StudentPatch};
use scholar_service::Message;
use serde::Deserialize;

use super::{body, query};
use crate::envelope::{ApiResult, Envelope};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentQuery {
    class_name: Option<String>,
}

/// GET /api/students?className=
pub(crate) async fn handle_list_students(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StudentQuery>, QueryRejection>,
) -> ApiResult {
    let params = query(&state, params)?;
    let students = state
        .query
        .list_students(params.class_name)
        .await
        .map_err(|e| state.fail(e))?;
    let count = students.len();
    Ok(Envelope::ok(students).count(count).into_response())
}

/// GET /api/students/{id}
pub(crate) async fn handle_get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let student = state.query.get_student(&id).await.map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(student).into_response())
}

/// POST /api/students
pub(crate) async fn handle_create_student(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> ApiResult {
    let input = body(&state, payload)?;
    let student = state
        .mutation
        .create_student(input)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok(student).message(state.text(Message::StudentCreated)),
    )
        .into_response())
}

/// PUT /api/students/{id}
pub(crate) async fn handle_update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<StudentPatch>, JsonRejection>,
) -> ApiResult {
    let patch = body(&state, payload)?;
    let student = state
        .mutation
        .update_student(&id, patch)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(student)
        .message(state.text(Message::StudentUpdated))
        .into_response())
}

/// DELETE /api/students/{id}
pub(crate) async fn handle_delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    state
        .mutation
        .delete_student(&id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(serde_json::json!({}))
        .message(state.text(Message::StudentDeleted))
        .into_response())
}
