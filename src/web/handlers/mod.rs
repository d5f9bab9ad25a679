//! API handlers.

pub mod auth;
pub mod file;

pub use auth::*;
pub use file::*;
