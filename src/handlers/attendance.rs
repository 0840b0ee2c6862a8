use crate::db::models::AttendanceRecordWire;
use crate::error::SignbookError;
use crate::router::SignbookState;
use crate::service::signing::{self, SignSessionInput, SignSessionRequest};
use crate::service::{GroupedView, reporting};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

/// GET /api/attendance — grouped views keyed by (learner, module).
pub async fn all_attendance(
    State(state): State<SignbookState>,
) -> Result<Json<Vec<GroupedView>>, SignbookError> {
    Ok(Json(reporting::all_attendance(&state.storage).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerModuleParams {
    pub learner_id: Option<String>,
    pub module_title: Option<String>,
}

/// GET /api/attendance/learner-module?learnerId=&moduleTitle= — the single
/// record for the pair in its stored four-column shape, or `{}` if none.
pub async fn learner_module_record(
    State(state): State<SignbookState>,
    Query(params): Query<LearnerModuleParams>,
) -> Result<Response, SignbookError> {
    let (Some(learner_id), Some(module_title)) = (params.learner_id, params.module_title) else {
        return Err(SignbookError::validation(
            "learnerId and moduleTitle are required",
        ));
    };
    let learner_id: i64 = learner_id
        .trim()
        .parse()
        .map_err(|_| SignbookError::validation("learnerId must be numeric"))?;

    let record = state.storage.get_record(learner_id, &module_title).await?;
    Ok(match record {
        Some(r) => Json(AttendanceRecordWire::from(r)).into_response(),
        None => Json(json!({})).into_response(),
    })
}

/// POST /api/sign-session — validate, then run the one-transaction write path.
pub async fn sign_session(
    State(state): State<SignbookState>,
    Json(req): Json<SignSessionRequest>,
) -> Result<impl IntoResponse, SignbookError> {
    let input = SignSessionInput::parse(req)?;
    let outcome = signing::sign_session(&state.storage, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Session {} signed successfully!", outcome.session_num),
            "learnerId": outcome.learner_id,
        })),
    ))
}
