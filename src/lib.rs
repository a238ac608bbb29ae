// Public API for integration tests and the server binary

pub mod api;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod store;
pub mod sweeper;
pub mod themes;
pub mod types;
