use crate::error::SignbookError;
use crate::router::SignbookState;
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/login — mock login: exact static-credential match returns the
/// fixed session token, anything else is a 401.
pub async fn login(
    State(state): State<SignbookState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, SignbookError> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user_ok = bool::from(username.as_bytes().ct_eq(state.auth.username.as_bytes()));
    let pass_ok = bool::from(password.as_bytes().ct_eq(state.auth.password.as_bytes()));

    if user_ok && pass_ok {
        Ok(Json(json!({ "token": state.auth.token.as_str() })))
    } else {
        Err(SignbookError::InvalidCredentials)
    }
}
