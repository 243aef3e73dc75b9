pub mod email_validator;
pub mod timestamp;

pub use email_validator::*;
pub use timestamp::*;
