//! Member domain: the persisted attendee records, reconciliation on
//! sign-in, check-in, and the roster view.

pub mod actions;
pub mod models;
pub mod roster;
