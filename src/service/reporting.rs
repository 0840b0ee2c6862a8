//! Read-model aggregation: fold physical attendance rows into one grouped
//! view per key. The dashboard view keys by (learner, module); the
//! per-learner history keys by (day, module).

use crate::db::{AttendanceStorage, JoinedAttendanceRow};
use crate::error::SignbookError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One denormalized response object per group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner_name: Option<String>,
    pub module_title: String,
    pub module_day: Option<String>,
    pub attendance_date: String,
    pub submission_timestamp: String,
    pub signatures: BTreeMap<u8, Option<String>>,
    pub is_signed_status: BTreeMap<u8, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keying {
    /// Dashboard-wide view: one group per (learner, module).
    LearnerModule,
    /// Per-learner history: one group per (day, module).
    DayModule,
}

/// Grouped views for every learner and module.
pub async fn all_attendance(storage: &AttendanceStorage) -> Result<Vec<GroupedView>, SignbookError> {
    let rows = storage.get_all_joined().await?;
    Ok(fold_grouped(rows, Keying::LearnerModule))
}

/// Grouped views for one learner, keyed by (day, module).
pub async fn attendance_for_learner(
    storage: &AttendanceStorage,
    learner_id: i64,
) -> Result<Vec<GroupedView>, SignbookError> {
    let rows = storage.get_records_for_learner(learner_id).await?;
    Ok(fold_grouped(rows, Keying::DayModule))
}

/// Fold rows (already ordered newest-first) into grouped views.
///
/// The first-seen row seeds its group; every row of the group then copies all
/// four signature/signed pairs into the view, so the last row in iteration
/// order wins per field. Separately, the maximum submission timestamp seen is
/// tracked and `attendance_date` stays paired with the row carrying it — a
/// freshness guard for the (normally impossible) multi-row-per-key case.
pub fn fold_grouped(rows: Vec<JoinedAttendanceRow>, keying: Keying) -> Vec<GroupedView> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut views: Vec<GroupedView> = Vec::new();

    for row in rows {
        let key = match keying {
            Keying::LearnerModule => (
                row.record.learner_id.to_string(),
                row.record.module_title.clone(),
            ),
            Keying::DayModule => (
                row.record.module_day.clone().unwrap_or_default(),
                row.record.module_title.clone(),
            ),
        };

        let idx = *index.entry(key).or_insert_with(|| {
            views.push(seed_view(&row, keying));
            views.len() - 1
        });
        let view = &mut views[idx];

        for (i, slot) in row.record.sessions.iter().enumerate() {
            let session = (i + 1) as u8;
            view.signatures.insert(session, slot.signature.clone());
            view.is_signed_status.insert(session, slot.signed);
        }

        // RFC 3339 timestamps in UTC order lexicographically.
        if row.record.submission_timestamp > view.submission_timestamp {
            view.submission_timestamp = row.record.submission_timestamp;
            view.attendance_date = row.record.attendance_date;
        }
    }

    views
}

fn seed_view(row: &JoinedAttendanceRow, keying: Keying) -> GroupedView {
    let (learner_id, learner_name) = match keying {
        Keying::LearnerModule => (
            Some(row.record.learner_id),
            Some(row.learner_name.clone()),
        ),
        Keying::DayModule => (None, None),
    };
    GroupedView {
        learner_id,
        learner_name,
        module_title: row.record.module_title.clone(),
        module_day: row.record.module_day.clone(),
        attendance_date: row.record.attendance_date.clone(),
        submission_timestamp: row.record.submission_timestamp.clone(),
        signatures: BTreeMap::new(),
        is_signed_status: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AttendanceRecord, SESSION_COUNT, SessionSlot};

    fn row(
        learner_id: i64,
        name: &str,
        module: &str,
        day: Option<&str>,
        signed: &[u8],
        stamp: &str,
        date: &str,
    ) -> JoinedAttendanceRow {
        let mut sessions: [SessionSlot; SESSION_COUNT] = Default::default();
        for &n in signed {
            sessions[usize::from(n) - 1] = SessionSlot {
                signature: Some(format!("sig-{n}")),
                signed: true,
            };
        }
        JoinedAttendanceRow {
            record: AttendanceRecord {
                record_id: learner_id * 10,
                learner_id,
                attendance_date: date.to_string(),
                module_title: module.to_string(),
                module_day: day.map(str::to_string),
                sessions,
                submission_timestamp: stamp.to_string(),
            },
            learner_name: name.to_string(),
        }
    }

    #[test]
    fn one_view_per_learner_module_pair() {
        let rows = vec![
            row(1, "Alice", "Fire Safety", None, &[1], "2024-02-01T09:00:00+00:00", "2024-02-01"),
            row(2, "Bob", "Fire Safety", None, &[2], "2024-01-15T09:00:00+00:00", "2024-01-15"),
            row(1, "Alice", "First Aid", None, &[3], "2024-01-01T09:00:00+00:00", "2024-01-01"),
        ];
        let views = fold_grouped(rows, Keying::LearnerModule);
        assert_eq!(views.len(), 3);
        // first-seen order is preserved
        assert_eq!(views[0].learner_name.as_deref(), Some("Alice"));
        assert_eq!(views[0].module_title, "Fire Safety");
        assert_eq!(views[0].signatures[&1].as_deref(), Some("sig-1"));
        assert!(views[0].is_signed_status[&1]);
        assert!(!views[0].is_signed_status[&2]);
    }

    #[test]
    fn multi_row_group_copies_pairs_in_iteration_order() {
        // Two physical rows for the same key; the later (older) row's pairs
        // win per field, while the timestamp guard keeps the newest stamp.
        let rows = vec![
            row(1, "Alice", "Fire Safety", None, &[1], "2024-02-01T09:00:00+00:00", "2024-02-01"),
            row(1, "Alice", "Fire Safety", None, &[2], "2024-01-01T09:00:00+00:00", "2024-01-01"),
        ];
        let views = fold_grouped(rows, Keying::LearnerModule);
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert!(!view.is_signed_status[&1]);
        assert!(view.is_signed_status[&2]);
        assert_eq!(view.submission_timestamp, "2024-02-01T09:00:00+00:00");
        assert_eq!(view.attendance_date, "2024-02-01");
    }

    #[test]
    fn freshness_guard_tracks_max_even_when_rows_arrive_out_of_order() {
        let rows = vec![
            row(1, "Alice", "Fire Safety", None, &[1], "2024-01-01T09:00:00+00:00", "2024-01-01"),
            row(1, "Alice", "Fire Safety", None, &[2], "2024-03-01T09:00:00+00:00", "2024-03-01"),
        ];
        let views = fold_grouped(rows, Keying::LearnerModule);
        assert_eq!(views[0].submission_timestamp, "2024-03-01T09:00:00+00:00");
        assert_eq!(views[0].attendance_date, "2024-03-01");
    }

    #[test]
    fn per_learner_view_keys_by_day_and_module() {
        let rows = vec![
            row(1, "Alice", "Fire Safety", Some("Mon"), &[1], "2024-02-01T09:00:00+00:00", "2024-02-01"),
            row(1, "Alice", "Fire Safety", Some("Tue"), &[2], "2024-01-15T09:00:00+00:00", "2024-01-15"),
            row(1, "Alice", "First Aid", None, &[1], "2024-01-01T09:00:00+00:00", "2024-01-01"),
        ];
        let views = fold_grouped(rows, Keying::DayModule);
        assert_eq!(views.len(), 3);
        // learner identity is omitted from the per-learner history
        assert!(views.iter().all(|v| v.learner_id.is_none()));
        assert_eq!(views[0].module_day.as_deref(), Some("Mon"));
    }

    #[test]
    fn null_day_rows_of_one_module_share_a_group() {
        let rows = vec![
            row(1, "Alice", "Fire Safety", None, &[1], "2024-02-01T09:00:00+00:00", "2024-02-01"),
            row(1, "Alice", "Fire Safety", None, &[2], "2024-01-15T09:00:00+00:00", "2024-01-15"),
        ];
        let views = fold_grouped(rows, Keying::DayModule);
        assert_eq!(views.len(), 1);
    }
}
