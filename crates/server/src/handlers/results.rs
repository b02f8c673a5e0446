use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use scholar_core::{NewResult, ResultPatch};
use scholar_service::{ListParams, Message};
use serde::Deserialize;

use super::{body, query};
use crate::envelope::{ApiResult, Envelope};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClassQuery {
    exam: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsQuery {
    class_name: Option<String>,
    exam: Option<String>,
}

/// GET /api/results
pub(crate) async fn handle_list_results(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult {
    let params = query(&state, params)?;
    let page = state
        .query
        .list_results(params)
        .await
        .map_err(|e| state.fail(e))?;
    let count = page.results.len();
    Ok(Envelope::ok(page.results)
        .count(count)
        .pagination(page.pagination)
        .into_response())
}

/// GET /api/results/{id}
pub(crate) async fn handle_get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let result = state.query.get_result(&id).await.map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(result).into_response())
}

/// POST /api/results
pub(crate) async fn handle_create_result(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewResult>, JsonRejection>,
) -> ApiResult {
    let input = body(&state, payload)?;
    let created = state
        .mutation
        .create_result(input)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok(created).message(state.text(Message::ResultCreated)),
    )
        .into_response())
}

/// PUT /api/results/{id}
pub(crate) async fn handle_update_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ResultPatch>, JsonRejection>,
) -> ApiResult {
    let patch = body(&state, payload)?;
    let updated = state
        .mutation
        .update_result(&id, patch)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(updated)
        .message(state.text(Message::ResultUpdated))
        .into_response())
}

/// DELETE /api/results/{id}
pub(crate) async fn handle_delete_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    state
        .mutation
        .delete_result(&id)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(serde_json::json!({}))
        .message(state.text(Message::ResultDeleted))
        .into_response())
}

/// GET /api/results/student/{studentId}
pub(crate) async fn handle_student_results(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> ApiResult {
    let results = state
        .query
        .results_for_student(&student_id)
        .await
        .map_err(|e| state.fail(e))?;
    let count = results.len();
    Ok(Envelope::ok(results).count(count).into_response())
}

/// GET /api/results/class/{className}?exam=
pub(crate) async fn handle_class_results(
    State(state): State<Arc<AppState>>,
    Path(class_name): Path<String>,
    params: Result<Query<ClassQuery>, QueryRejection>,
) -> ApiResult {
    let params = query(&state, params)?;
    let results = state
        .query
        .results_for_class(&class_name, params.exam)
        .await
        .map_err(|e| state.fail(e))?;
    let count = results.len();
    Ok(Envelope::ok(results).count(count).into_response())
}

/// GET /api/results/statistics?className=&exam=
pub(crate) async fn handle_statistics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult {
    let params = query(&state, params)?;
    let stats = state
        .query
        .statistics(params.class_name, params.exam)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Envelope::ok(stats).into_response())
}

/// GET /api/results/recent/{limit}
pub(crate) async fn handle_recent_results(
    State(state): State<Arc<AppState>>,
    Path(limit): Path<String>,
) -> ApiResult {
    recent(&state, Some(&limit)).await
}

/// GET /api/results/recent
pub(crate) async fn handle_recent_results_default(State(state): State<Arc<AppState>>) -> ApiResult {
    recent(&state, None).await
}

async fn recent(state: &AppState, limit: Option<&str>) -> ApiResult {
    let results = state
        .query
        .recent_results(limit)
        .await
        .map_err(|e| state.fail(e))?;
    let count = results.len();
    Ok(Envelope::ok(results).count(count).into_response())
}
