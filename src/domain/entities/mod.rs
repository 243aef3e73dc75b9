pub mod analysis;
pub mod analytics;
pub mod conversation;
pub mod user;

pub use analysis::*;
pub use analytics::*;
pub use conversation::*;
pub use user::*;
