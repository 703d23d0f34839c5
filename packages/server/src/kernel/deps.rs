//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to domain actions and the HTTP
//! surface. Both external collaborators sit behind trait objects so tests
//! can swap in the mocks from `test_dependencies`.

use std::sync::Arc;

use super::traits::{BaseIdentityGateway, BaseMemberStore};
use crate::domains::auth::JwtService;

/// Dependencies accessible to actions and routes.
#[derive(Clone)]
pub struct ServerDeps {
    pub member_store: Arc<dyn BaseMemberStore>,
    pub identity: Arc<dyn BaseIdentityGateway>,
    /// Session token service for the HTTP surface.
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        member_store: Arc<dyn BaseMemberStore>,
        identity: Arc<dyn BaseIdentityGateway>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            member_store,
            identity,
            jwt_service,
        }
    }
}
