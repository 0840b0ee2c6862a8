use serde::{Deserialize, Serialize};

pub const SESSION_COUNT: usize = 4;

/// One of the four independently signable slots of a record.
/// Invariant: `signed == signature.is_some()` — the write path only ever sets
/// a slot, never clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSlot {
    pub signature: Option<String>,
    pub signed: bool,
}

/// How the signing path resolves its learner row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnerRef {
    /// The "NEW" sentinel: look up by exact name, creating the row on a miss.
    New,
    /// A client-supplied id that must already exist.
    Existing(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Learner {
    pub learner_id: i64,
    pub learner_name: String,
    pub registration_date: String,
}

/// Search results carry identity only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LearnerSummary {
    pub learner_id: i64,
    pub learner_name: String,
}

/// A record row with the `signature_1..4` / `is_signed_1..4` column pairs
/// folded into a fixed-size array. Conversion to and from the four-column
/// shape lives at this boundary only.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub record_id: i64,
    pub learner_id: i64,
    pub attendance_date: String,
    pub module_title: String,
    pub module_day: Option<String>,
    pub sessions: [SessionSlot; SESSION_COUNT],
    pub submission_timestamp: String,
}

impl AttendanceRecord {
    /// Slot for a 1-based session number. Callers validate the range first.
    pub fn slot(&self, session_num: u8) -> &SessionSlot {
        &self.sessions[usize::from(session_num) - 1]
    }
}

/// JSON twin of `AttendanceRecord` keeping the stored column names, so the
/// HTTP surface stays row-shaped.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceRecordWire {
    pub record_id: i64,
    pub learner_id: i64,
    pub attendance_date: String,
    pub module_title: String,
    pub module_day: Option<String>,
    pub signature_1: Option<String>,
    pub signature_2: Option<String>,
    pub signature_3: Option<String>,
    pub signature_4: Option<String>,
    pub is_signed_1: bool,
    pub is_signed_2: bool,
    pub is_signed_3: bool,
    pub is_signed_4: bool,
    pub submission_timestamp: String,
}

impl From<AttendanceRecord> for AttendanceRecordWire {
    fn from(r: AttendanceRecord) -> Self {
        let [s1, s2, s3, s4] = r.sessions;
        Self {
            record_id: r.record_id,
            learner_id: r.learner_id,
            attendance_date: r.attendance_date,
            module_title: r.module_title,
            module_day: r.module_day,
            is_signed_1: s1.signed,
            is_signed_2: s2.signed,
            is_signed_3: s3.signed,
            is_signed_4: s4.signed,
            signature_1: s1.signature,
            signature_2: s2.signature,
            signature_3: s3.signature,
            signature_4: s4.signature,
            submission_timestamp: r.submission_timestamp,
        }
    }
}

/// An attendance row joined with its learner's name, as read by the
/// reporting queries.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedAttendanceRow {
    pub record: AttendanceRecord,
    pub learner_name: String,
}
