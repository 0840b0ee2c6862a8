use crate::db::AttendanceStorage;
use crate::handlers::{attendance, learners, login};
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

/// Static credentials and the fixed token served by the mock login endpoint.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub username: String,
    pub password: String,
    pub token: String,
}

#[derive(Clone)]
pub struct SignbookState {
    pub storage: AttendanceStorage,
    pub auth: Arc<AdminAuth>,
}

impl SignbookState {
    pub fn new(storage: AttendanceStorage, auth: AdminAuth) -> Self {
        Self {
            storage,
            auth: Arc::new(auth),
        }
    }
}

pub fn signbook_router(state: SignbookState) -> Router {
    Router::new()
        .route("/api/learners", get(learners::list_learners))
        .route("/api/learners/search", get(learners::search_learners))
        .route("/api/learners/count", get(learners::learner_count))
        .route("/api/learners/{id}", delete(learners::delete_learner))
        .route(
            "/api/learners/{id}/attendance",
            get(learners::learner_attendance),
        )
        .route("/api/attendance", get(attendance::all_attendance))
        .route(
            "/api/attendance/learner-module",
            get(attendance::learner_module_record),
        )
        .route("/api/sign-session", post(attendance::sign_session))
        .route("/api/login", post(login::login))
        .with_state(state)
}
