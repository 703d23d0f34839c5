//! Pre-registration action
//!
//! Creates a member record before the person has ever signed in, keyed
//! by the encoded email address. The record is merged into the canonical
//! subject-keyed record on first sign-in.

use tracing::info;

use crate::domains::member::models::{Member, MemberKey, NewMember, Role, ServerNow};
use crate::kernel::{BaseMemberStore, StoreError};

/// Register a member out-of-band, typically to grant the admin role
/// before their first sign-in.
pub async fn pre_register(
    email: &str,
    name: &str,
    role: Role,
    store: &dyn BaseMemberStore,
) -> Result<Member, StoreError> {
    let key = MemberKey::for_email(email);
    info!(email, key = %key, %role, "pre-registering member");

    store
        .create(
            &key,
            NewMember {
                uid: None,
                email: email.to_string(),
                name: name.to_string(),
                avatar_url: String::new(),
                role,
                created_at: Some(ServerNow),
                last_login_at: None,
                checked_in: false,
                is_pre_registered: true,
            },
        )
        .await
}
