//! Session signing: request validation and the call into the storage
//! transaction. All store writes happen inside `AttendanceStorage::sign_session`.

use crate::db::{AttendanceStorage, LearnerRef};
use crate::error::SignbookError;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Sentinel learnerId meaning "resolve or create by name".
pub const NEW_LEARNER_SENTINEL: &str = "NEW";

/// Raw POST /api/sign-session body. Fields are optional (and loosely typed
/// where clients send either numbers or strings) so validation can answer
/// with a 400 `message` instead of a deserializer rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignSessionRequest {
    pub learner_name: Option<String>,
    pub learner_id: Option<Value>,
    pub attendance_date: Option<String>,
    pub module_title: Option<String>,
    pub session_num: Option<Value>,
    pub signature_data: Option<String>,
}

/// A fully validated signing request.
#[derive(Debug, Clone, PartialEq)]
pub struct SignSessionInput {
    pub learner: LearnerRef,
    pub learner_name: String,
    pub attendance_date: String,
    pub module_title: String,
    pub session_num: u8,
    pub signature: String,
}

impl SignSessionInput {
    pub fn parse(req: SignSessionRequest) -> Result<Self, SignbookError> {
        let learner_name = require_text(req.learner_name, "learnerName")?;
        let attendance_date = require_text(req.attendance_date, "attendanceDate")?;
        let module_title = require_text(req.module_title, "moduleTitle")?;
        let signature = require_text(req.signature_data, "signatureData")?;
        let learner = parse_learner_ref(req.learner_id)?;
        let session_num = parse_session_num(req.session_num)?;
        Ok(Self {
            learner,
            learner_name,
            attendance_date,
            module_title,
            session_num,
            signature,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOutcome {
    pub learner_id: i64,
    pub session_num: u8,
}

/// Run the signing transaction for a validated input.
pub async fn sign_session(
    storage: &AttendanceStorage,
    input: SignSessionInput,
) -> Result<SignOutcome, SignbookError> {
    let learner_id = storage
        .sign_session(
            input.learner,
            &input.learner_name,
            &input.attendance_date,
            &input.module_title,
            input.session_num,
            &input.signature,
        )
        .await?;
    info!(
        learner_id,
        module = %input.module_title,
        session = input.session_num,
        "session signed"
    );
    Ok(SignOutcome {
        learner_id,
        session_num: input.session_num,
    })
}

fn require_text(field: Option<String>, name: &str) -> Result<String, SignbookError> {
    match field {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(SignbookError::validation(format!(
            "Missing required field: {name}"
        ))),
    }
}

fn parse_learner_ref(value: Option<Value>) -> Result<LearnerRef, SignbookError> {
    match value {
        Some(Value::String(s)) if s == NEW_LEARNER_SENTINEL => Ok(LearnerRef::New),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(LearnerRef::Existing)
            .map_err(|_| SignbookError::validation("Missing or invalid learnerId")),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(LearnerRef::Existing)
            .ok_or_else(|| SignbookError::validation("Missing or invalid learnerId")),
        _ => Err(SignbookError::validation(
            "Missing required field: learnerId",
        )),
    }
}

fn parse_session_num(value: Option<Value>) -> Result<u8, SignbookError> {
    let n = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match n {
        Some(n @ 1..=4) => Ok(n as u8),
        _ => Err(SignbookError::validation(
            "sessionNum must be a number between 1 and 4",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_request() -> SignSessionRequest {
        SignSessionRequest {
            learner_name: Some("Alice".to_string()),
            learner_id: Some(json!("NEW")),
            attendance_date: Some("2024-01-01".to_string()),
            module_title: Some("Fire Safety".to_string()),
            session_num: Some(json!(2)),
            signature_data: Some("<blob>".to_string()),
        }
    }

    #[test]
    fn parses_new_sentinel() {
        let input = SignSessionInput::parse(full_request()).unwrap();
        assert_eq!(input.learner, LearnerRef::New);
        assert_eq!(input.session_num, 2);
    }

    #[test]
    fn parses_numeric_and_stringy_learner_ids() {
        let mut req = full_request();
        req.learner_id = Some(json!(42));
        let input = SignSessionInput::parse(req).unwrap();
        assert_eq!(input.learner, LearnerRef::Existing(42));

        let mut req = full_request();
        req.learner_id = Some(json!("42"));
        let input = SignSessionInput::parse(req).unwrap();
        assert_eq!(input.learner, LearnerRef::Existing(42));
    }

    #[test]
    fn rejects_missing_fields() {
        let mut req = full_request();
        req.signature_data = None;
        let err = SignSessionInput::parse(req).unwrap_err();
        assert!(matches!(err, SignbookError::Validation(_)));

        let mut req = full_request();
        req.learner_name = Some("   ".to_string());
        assert!(SignSessionInput::parse(req).is_err());
    }

    #[test]
    fn rejects_out_of_range_session_numbers() {
        for bad in [json!(0), json!(5), json!("x"), json!(null)] {
            let mut req = full_request();
            req.session_num = Some(bad);
            assert!(SignSessionInput::parse(req).is_err());
        }
    }

    #[test]
    fn session_num_accepts_string_digits() {
        let mut req = full_request();
        req.session_num = Some(json!("4"));
        assert_eq!(SignSessionInput::parse(req).unwrap().session_num, 4);
    }
}
