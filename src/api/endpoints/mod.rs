//! API endpoint handlers.

pub mod generate;
pub mod health;
pub mod sessions;
pub mod welcome;
