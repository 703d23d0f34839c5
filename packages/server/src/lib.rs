// Doorlist - event check-in API core
//
// This crate is the orchestration layer over the identity provider and the
// member document store: membership reconciliation on sign-in, session
// lifecycle, roster views, and the administrative check-in surface.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
