// Common types and utilities shared across the application

pub mod app_state;

pub use app_state::AppState;
