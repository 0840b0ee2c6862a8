use crate::db::models::{Learner, LearnerSummary};
use crate::error::SignbookError;
use crate::router::SignbookState;
use crate::service::{GroupedView, reporting};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// GET /api/learners/search?query= — substring match, at most 10 rows.
/// Queries under two characters come back as an empty array.
pub async fn search_learners(
    State(state): State<SignbookState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<LearnerSummary>>, SignbookError> {
    let query = params.query.unwrap_or_default();
    Ok(Json(state.storage.search_learners(&query).await?))
}

/// GET /api/learners — newest registration first.
pub async fn list_learners(
    State(state): State<SignbookState>,
) -> Result<Json<Vec<Learner>>, SignbookError> {
    Ok(Json(state.storage.list_learners().await?))
}

/// GET /api/learners/count
pub async fn learner_count(
    State(state): State<SignbookState>,
) -> Result<Json<Value>, SignbookError> {
    let total = state.storage.count_learners().await?;
    Ok(Json(json!({ "total_learners": total })))
}

/// GET /api/learners/{id}/attendance — grouped views keyed by (day, module).
pub async fn learner_attendance(
    State(state): State<SignbookState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<GroupedView>>, SignbookError> {
    Ok(Json(
        reporting::attendance_for_learner(&state.storage, id).await?,
    ))
}

/// DELETE /api/learners/{id} — learner and attendance rows go together,
/// or not at all.
pub async fn delete_learner(
    State(state): State<SignbookState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, SignbookError> {
    state.storage.delete_learner(id).await?;
    info!(learner_id = id, "learner deleted");
    Ok(Json(json!({
        "message": "Learner and associated attendance records deleted successfully"
    })))
}
