// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Business
// logic (like "reconcile a sign-in") lives in domain actions that use
// these traits.
//
// Naming convention: Base* for trait names.

use async_trait::async_trait;
use thiserror::Error;

use crate::domains::auth::errors::AuthError;
use crate::domains::member::models::{Member, MemberKey, MemberPatch, NewMember};

/// Errors from the member store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("member store error: {0}")]
    Backend(String),
}

// =============================================================================
// Member Store Trait (Infrastructure - document database)
// =============================================================================

#[async_trait]
pub trait BaseMemberStore: Send + Sync {
    /// Fetch the record at `key`. A missing record is `Ok(None)`.
    async fn get(&self, key: &MemberKey) -> Result<Option<Member>, StoreError>;

    /// Create or fully overwrite the record at `key`. Returns the stored
    /// record with server-assigned timestamps resolved.
    async fn create(&self, key: &MemberKey, member: NewMember) -> Result<Member, StoreError>;

    /// Partially update the record at `key`. Fails with `NotFound` when
    /// the record does not exist.
    async fn update(&self, key: &MemberKey, patch: MemberPatch) -> Result<Member, StoreError>;

    /// The full member set. No pagination cursor; each call returns the
    /// complete collection.
    async fn list_all(&self) -> Result<Vec<Member>, StoreError>;
}

// =============================================================================
// Identity Gateway Trait (Infrastructure - third-party sign-in)
// =============================================================================

/// Profile yielded by the identity provider for a verified subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub subject_id: String,
    pub email: String,
    /// May be empty when the provider holds no display name.
    pub display_name: String,
    /// May be empty when the provider holds no avatar.
    pub avatar_url: String,
}

#[async_trait]
pub trait BaseIdentityGateway: Send + Sync {
    /// Verify a provider credential and yield the subject's profile.
    async fn sign_in(&self, credential: &str) -> Result<IdentityProfile, AuthError>;

    /// Finish a sign-in flow that completed out-of-band, if one is
    /// pending. Consumed exactly once; a second call returns `None`.
    async fn complete_redirect_sign_in(&self) -> Result<Option<IdentityProfile>, AuthError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), AuthError>;
}
