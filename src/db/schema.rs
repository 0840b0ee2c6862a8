//! SQL DDL for initializing the attendance store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema:
/// - `learners`: identity rows, `registration_date` defaulted by the store,
///   `learner_name` UNIQUE so concurrent find-or-create cannot duplicate a name.
/// - `attendance_records`: one row per (learner, module) with the four
///   denormalized signature slots; `UNIQUE(learner_id, module_title)` backs the
///   at-most-one-row invariant that the write path also checks.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS learners (
    learner_id INTEGER PRIMARY KEY AUTOINCREMENT,
    learner_name TEXT NOT NULL UNIQUE,
    registration_date TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS attendance_records (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    learner_id INTEGER NOT NULL REFERENCES learners(learner_id),
    attendance_date TEXT NOT NULL,
    module_title TEXT NOT NULL,
    module_day TEXT NULL, -- legacy column, never written by the signing path
    signature_1 TEXT NULL,
    signature_2 TEXT NULL,
    signature_3 TEXT NULL,
    signature_4 TEXT NULL,
    is_signed_1 INTEGER NOT NULL DEFAULT 0,
    is_signed_2 INTEGER NOT NULL DEFAULT 0,
    is_signed_3 INTEGER NOT NULL DEFAULT 0,
    is_signed_4 INTEGER NOT NULL DEFAULT 0,
    submission_timestamp TEXT NOT NULL, -- RFC3339
    UNIQUE(learner_id, module_title)
);

CREATE INDEX IF NOT EXISTS idx_attendance_records_learner_id
    ON attendance_records(learner_id);
"#;
