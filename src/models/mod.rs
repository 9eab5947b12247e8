pub mod threshold;
pub mod user;

pub use threshold::{Condition, Threshold};
pub use user::{CurrentUser, User};
