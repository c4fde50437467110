pub mod conversation;
pub mod error;
pub mod utils;
