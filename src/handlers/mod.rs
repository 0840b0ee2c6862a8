pub mod attendance;
pub mod learners;
pub mod login;
