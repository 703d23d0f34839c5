//! Update member role action

use tracing::info;

use crate::domains::member::models::{Member, MemberKey, MemberPatch, Role, ServerNow};
use crate::kernel::{BaseMemberStore, StoreError};

/// Change a member's role.
///
/// This is the only path that changes a role after the record exists;
/// reconciliation never touches it. Admin-only at the surface layer.
pub async fn update_role(
    member_id: &str,
    role: Role,
    store: &dyn BaseMemberStore,
) -> Result<Member, StoreError> {
    info!("updating member {} role to {}", member_id, role);

    let patch = MemberPatch {
        role: Some(role),
        updated_at: Some(ServerNow),
        ..MemberPatch::default()
    };
    store.update(&MemberKey::from_id(member_id), patch).await
}
