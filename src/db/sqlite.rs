use crate::db::models::{
    AttendanceRecord, JoinedAttendanceRow, Learner, LearnerRef, LearnerSummary, SESSION_COUNT,
    SessionSlot,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::SignbookError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Queries shorter than this return an empty result without touching the store.
pub const MIN_SEARCH_LEN: usize = 2;
/// Cap on learner search results.
pub const SEARCH_LIMIT: i64 = 10;

const RECORD_COLUMNS: &str = "record_id, learner_id, attendance_date, module_title, module_day, \
                              signature_1, signature_2, signature_3, signature_4, \
                              is_signed_1, is_signed_2, is_signed_3, is_signed_4, \
                              submission_timestamp";

/// Open (creating if missing) the SQLite database behind a bounded pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, SignbookError> {
    let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct AttendanceStorage {
    pool: SqlitePool,
}

impl AttendanceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), SignbookError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- learner directory ----

    /// Substring search over learner names, capped at `SEARCH_LIMIT` rows.
    /// Short queries short-circuit to an empty Vec before any query runs.
    pub async fn search_learners(&self, query: &str) -> Result<Vec<LearnerSummary>, SignbookError> {
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        let pattern = format!("%{query}%");
        let rows: Vec<LearnerSummary> = sqlx::query_as(
            "SELECT learner_id, learner_name FROM learners WHERE learner_name LIKE ? LIMIT ?",
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All learners, most recently registered first.
    pub async fn list_learners(&self) -> Result<Vec<Learner>, SignbookError> {
        let rows: Vec<Learner> = sqlx::query_as(
            "SELECT learner_id, learner_name, registration_date FROM learners \
             ORDER BY registration_date DESC, learner_id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_learners(&self) -> Result<i64, SignbookError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM learners")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Remove a learner and all of their attendance rows as one transaction.
    /// A missing id reports `NotFound` with nothing written.
    pub async fn delete_learner(&self, learner_id: i64) -> Result<(), SignbookError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT learner_id FROM learners WHERE learner_id = ?")
                .bind(learner_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(SignbookError::not_found("Learner not found"));
        }

        sqlx::query("DELETE FROM attendance_records WHERE learner_id = ?")
            .bind(learner_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM learners WHERE learner_id = ?")
            .bind(learner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---- attendance record store ----

    /// At most one row exists per (learner, module) pair.
    pub async fn get_record(
        &self,
        learner_id: i64,
        module_title: &str,
    ) -> Result<Option<AttendanceRecord>, SignbookError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records \
             WHERE learner_id = ? AND module_title = ?"
        ))
        .bind(learner_id)
        .bind(module_title)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_record).transpose()
    }

    /// Every attendance row joined with its learner name, newest first.
    pub async fn get_all_joined(&self) -> Result<Vec<JoinedAttendanceRow>, SignbookError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS}, learner_name FROM attendance_records \
             JOIN learners USING (learner_id) \
             ORDER BY submission_timestamp DESC, attendance_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_joined).collect()
    }

    /// One learner's attendance rows, same ordering as `get_all_joined`.
    pub async fn get_records_for_learner(
        &self,
        learner_id: i64,
    ) -> Result<Vec<JoinedAttendanceRow>, SignbookError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS}, learner_name FROM attendance_records \
             JOIN learners USING (learner_id) \
             WHERE learner_id = ? \
             ORDER BY submission_timestamp DESC, attendance_date DESC"
        ))
        .bind(learner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_joined).collect()
    }

    // ---- session signing ----

    /// The signing write path, one atomic transaction: resolve (or create)
    /// the learner, then set exactly one signature slot on the
    /// (learner, module) record, inserting the record on first signing.
    /// Returns the resolved learner id. Any failure rolls the whole
    /// transaction back, so a learner created for the `New` branch never
    /// outlives a failed record write.
    pub async fn sign_session(
        &self,
        learner: LearnerRef,
        learner_name: &str,
        attendance_date: &str,
        module_title: &str,
        session_num: u8,
        signature: &str,
    ) -> Result<i64, SignbookError> {
        let mut tx = self.pool.begin().await?;

        let learner_id = match learner {
            LearnerRef::New => {
                let existing: Option<(i64,)> =
                    sqlx::query_as("SELECT learner_id FROM learners WHERE learner_name = ?")
                        .bind(learner_name)
                        .fetch_optional(&mut *tx)
                        .await?;
                match existing {
                    Some((id,)) => id,
                    None => {
                        let res = sqlx::query("INSERT INTO learners (learner_name) VALUES (?)")
                            .bind(learner_name)
                            .execute(&mut *tx)
                            .await?;
                        res.last_insert_rowid()
                    }
                }
            }
            LearnerRef::Existing(id) => {
                // Deliberate asymmetry from the "NEW" branch: a supplied id
                // is never auto-created.
                let found: Option<(i64,)> =
                    sqlx::query_as("SELECT learner_id FROM learners WHERE learner_id = ?")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?;
                found
                    .ok_or_else(|| {
                        SignbookError::not_found(format!("Learner with id {id} not found"))
                    })?
                    .0
            }
        };

        let existing_record: Option<(i64,)> = sqlx::query_as(
            "SELECT record_id FROM attendance_records WHERE learner_id = ? AND module_title = ?",
        )
        .bind(learner_id)
        .bind(module_title)
        .fetch_optional(&mut *tx)
        .await?;

        let now = Utc::now().to_rfc3339();
        let (sig_col, flag_col) = session_columns(session_num);

        match existing_record {
            Some((record_id,)) => {
                // Only the target slot moves; the other three stay untouched.
                sqlx::query(&format!(
                    "UPDATE attendance_records SET {sig_col} = ?, {flag_col} = 1, \
                     attendance_date = ?, submission_timestamp = ? WHERE record_id = ?"
                ))
                .bind(signature)
                .bind(attendance_date)
                .bind(&now)
                .bind(record_id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(&format!(
                    "INSERT INTO attendance_records \
                     (learner_id, attendance_date, module_title, {sig_col}, {flag_col}, \
                      submission_timestamp) VALUES (?, ?, ?, ?, 1, ?)"
                ))
                .bind(learner_id)
                .bind(attendance_date)
                .bind(module_title)
                .bind(signature)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(learner_id)
    }

    // ---- row mapping ----

    fn row_to_record(row: SqliteRow) -> Result<AttendanceRecord, SignbookError> {
        let record_id: i64 = row.try_get("record_id")?;
        let learner_id: i64 = row.try_get("learner_id")?;
        let attendance_date: String = row.try_get("attendance_date")?;
        let module_title: String = row.try_get("module_title")?;
        let module_day: Option<String> = row.try_get("module_day")?;
        let submission_timestamp: String = row.try_get("submission_timestamp")?;

        let mut sessions: [SessionSlot; SESSION_COUNT] = Default::default();
        for (idx, slot) in sessions.iter_mut().enumerate() {
            let n = idx + 1;
            let signature: Option<String> = row.try_get(format!("signature_{n}").as_str())?;
            let signed_i: i64 = row.try_get(format!("is_signed_{n}").as_str())?;
            *slot = SessionSlot {
                signature,
                signed: signed_i != 0,
            };
        }

        Ok(AttendanceRecord {
            record_id,
            learner_id,
            attendance_date,
            module_title,
            module_day,
            sessions,
            submission_timestamp,
        })
    }

    fn row_to_joined(row: SqliteRow) -> Result<JoinedAttendanceRow, SignbookError> {
        let learner_name: String = row.try_get("learner_name")?;
        let record = Self::row_to_record(row)?;
        Ok(JoinedAttendanceRow {
            record,
            learner_name,
        })
    }
}

/// Column pair for a 1-based session number. Callers validate the range;
/// out-of-range here is a programming bug.
fn session_columns(session_num: u8) -> (&'static str, &'static str) {
    match session_num {
        1 => ("signature_1", "is_signed_1"),
        2 => ("signature_2", "is_signed_2"),
        3 => ("signature_3", "is_signed_3"),
        4 => ("signature_4", "is_signed_4"),
        n => unreachable!("session number {n} out of range"),
    }
}
