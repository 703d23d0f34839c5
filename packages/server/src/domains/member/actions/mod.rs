//! Member actions
//!
//! Plain async functions over the member store; auth checks happen at
//! the surface layer (HTTP routes / CLI).

mod check_in;
mod pre_register;
mod queries;
mod reconcile;
mod update_role;

pub use check_in::check_in;
pub use pre_register::pre_register;
pub use queries::list_members;
pub use reconcile::reconcile_sign_in;
pub use update_role::update_role;
