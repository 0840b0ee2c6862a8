pub mod reporting;
pub mod signing;

pub use reporting::{GroupedView, Keying};
pub use signing::{SignOutcome, SignSessionInput, SignSessionRequest};
