//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pooled storage implementing the learner directory,
//!   the attendance record store, and the signing transaction

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{AttendanceRecord, JoinedAttendanceRow, Learner, LearnerRef, SessionSlot};
pub use schema::SQLITE_INIT;
pub use sqlite::{AttendanceStorage, SqlitePool, connect};
