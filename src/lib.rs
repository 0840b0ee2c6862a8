pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod service;

pub use db::AttendanceStorage;
pub use error::SignbookError;
pub use router::{AdminAuth, SignbookState, signbook_router};
