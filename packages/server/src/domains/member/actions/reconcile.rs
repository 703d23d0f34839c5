//! Membership reconciliation on sign-in.

use tracing::{debug, info};

use crate::domains::member::models::{Member, MemberKey, MemberPatch, NewMember, Role, ServerNow};
use crate::kernel::{BaseMemberStore, IdentityProfile, StoreError};

/// Create or update the member record for a verified sign-in.
///
/// A first sign-in consumes any pre-registration record keyed by the
/// signer's email: the new subject-keyed record inherits its role. A
/// returning signer only gets `lastLogin` and non-empty profile fields
/// refreshed; the role is never touched on this path - only the explicit
/// administrative role update changes it afterwards.
///
/// Any store failure fails the reconciliation as a whole; callers must
/// treat the sign-in as not completed.
pub async fn reconcile_sign_in(
    profile: &IdentityProfile,
    store: &dyn BaseMemberStore,
) -> Result<Member, StoreError> {
    let subject_key = MemberKey::for_subject(&profile.subject_id);

    match store.get(&subject_key).await? {
        Some(_) => {
            debug!(subject = %subject_key, "returning member, refreshing profile");
            let patch = MemberPatch {
                // never overwrite a non-empty stored field with an empty
                // provider value
                name: non_empty(&profile.display_name),
                avatar_url: non_empty(&profile.avatar_url),
                last_login_at: Some(ServerNow),
                ..MemberPatch::default()
            };
            store.update(&subject_key, patch).await
        }
        None => {
            let email_key = MemberKey::for_email(&profile.email);
            let pre_registration = store.get(&email_key).await?;
            let role = pre_registration
                .as_ref()
                .map(|record| record.role)
                .unwrap_or(Role::User);

            if pre_registration.is_some() {
                // the consumed record stays under its email key
                debug!(email_key = %email_key, "pre-registration record retained after merge");
            }

            let member = store
                .create(
                    &subject_key,
                    NewMember {
                        uid: Some(profile.subject_id.clone()),
                        email: profile.email.clone(),
                        name: profile.display_name.clone(),
                        avatar_url: profile.avatar_url.clone(),
                        role,
                        created_at: Some(ServerNow),
                        last_login_at: Some(ServerNow),
                        checked_in: false,
                        is_pre_registered: false,
                    },
                )
                .await?;

            info!(member = %member.id, %role, "created member record on first sign-in");
            Ok(member)
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
