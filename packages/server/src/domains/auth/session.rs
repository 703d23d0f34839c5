//! Session lifecycle for an operator-facing client.
//!
//! The controller owns the signed-in/signed-out state and is the only
//! place that transitions it. A sign-in is complete only after the member
//! record has been reconciled and read back; a signer is never reported
//! signed in without a verified record.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::errors::AuthError;
use crate::domains::member::actions::reconcile_sign_in;
use crate::domains::member::models::{Member, MemberKey, Role};
use crate::kernel::{BaseIdentityGateway, BaseMemberStore, IdentityProfile, StoreError};

/// Signed-in user as resolved from the member record.
#[derive(Debug, Clone)]
pub struct SignedInUser {
    pub member: Member,
    /// Role read back from the store after reconciliation, never inferred
    /// from the identity provider.
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    Authenticating,
    SignedIn(SignedInUser),
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }
}

/// Reconcile a verified profile and read the record back for the
/// authoritative role.
pub async fn complete_sign_in(
    profile: &IdentityProfile,
    store: &dyn BaseMemberStore,
) -> Result<SignedInUser, AuthError> {
    reconcile_sign_in(profile, store).await?;

    let key = MemberKey::for_subject(&profile.subject_id);
    let member = store
        .get(&key)
        .await?
        .ok_or_else(|| AuthError::Store(StoreError::NotFound(key.to_string())))?;
    let role = member.role;

    info!(subject = %member.id, %role, "sign-in complete");
    Ok(SignedInUser { member, role })
}

pub struct SessionController {
    gateway: Arc<dyn BaseIdentityGateway>,
    store: Arc<dyn BaseMemberStore>,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(gateway: Arc<dyn BaseIdentityGateway>, store: Arc<dyn BaseMemberStore>) -> Self {
        Self {
            gateway,
            store,
            state: Mutex::new(SessionState::SignedOut),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn current_user(&self) -> Option<SignedInUser> {
        match &*self.state.lock().await {
            SessionState::SignedIn(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Finish a sign-in that completed out-of-band, if one is pending.
    ///
    /// Must be called once at startup, before the first interactive
    /// sign-in. Returns `true` when a pending flow was completed.
    pub async fn resume_if_pending(&self) -> Result<bool, AuthError> {
        {
            let mut state = self.state.lock().await;
            if !matches!(*state, SessionState::SignedOut) {
                return Ok(false);
            }
            *state = SessionState::Authenticating;
        }

        let outcome = match self.gateway.complete_redirect_sign_in().await {
            Ok(Some(profile)) => complete_sign_in(&profile, self.store.as_ref())
                .await
                .map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        match outcome {
            Ok(Some(user)) => {
                *state = SessionState::SignedIn(user);
                Ok(true)
            }
            Ok(None) => {
                debug!("no pending sign-in to resume");
                *state = SessionState::SignedOut;
                Ok(false)
            }
            Err(e) => {
                *state = SessionState::SignedOut;
                Err(e)
            }
        }
    }

    /// Verify a credential, reconcile the member record, and enter
    /// `SignedIn`.
    ///
    /// A second request while one is in flight fails immediately with
    /// `SignInInProgress` without touching the gateway.
    pub async fn sign_in(&self, credential: &str) -> Result<SignedInUser, AuthError> {
        {
            let mut state = self.state.lock().await;
            if matches!(*state, SessionState::Authenticating) {
                return Err(AuthError::SignInInProgress);
            }
            *state = SessionState::Authenticating;
        }

        let outcome = match self.gateway.sign_in(credential).await {
            Ok(profile) => complete_sign_in(&profile, self.store.as_ref()).await,
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        match outcome {
            Ok(user) => {
                *state = SessionState::SignedIn(user.clone());
                Ok(user)
            }
            Err(e) => {
                *state = SessionState::SignedOut;
                Err(e)
            }
        }
    }

    /// End the session. The local state settles to `SignedOut` even when
    /// the provider call fails; the error is still surfaced to the caller.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.gateway.sign_out().await;
        if let Err(e) = &result {
            warn!("provider sign-out failed: {}", e);
        }

        let mut state = self.state.lock().await;
        *state = SessionState::SignedOut;
        result
    }

    /// The identity provider reported the underlying session ended.
    pub async fn handle_session_ended(&self) {
        let mut state = self.state.lock().await;
        if !matches!(*state, SessionState::SignedOut) {
            info!("provider session ended, signing out");
            *state = SessionState::SignedOut;
        }
    }
}
