//! Studio Quote: project request wizard and lead store for a creative studio.

pub mod admin;
pub mod config;
pub mod error;
pub mod quote;
pub mod server;
pub mod store;
