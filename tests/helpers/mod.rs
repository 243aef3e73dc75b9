#![allow(unused_imports)]
pub mod conversation_helpers;
pub mod test_db;

pub use conversation_helpers::*;
pub use test_db::*;
