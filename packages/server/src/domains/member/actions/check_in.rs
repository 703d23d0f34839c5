//! Check-in action

use tracing::info;

use crate::domains::member::models::{Member, MemberKey, MemberPatch, ServerNow};
use crate::kernel::{BaseMemberStore, StoreError};

/// Mark a member as checked in.
///
/// The transition is one-way: nothing in the system clears the flag
/// again. Calling this for an already-checked-in member is not an error;
/// the write is issued as-is and re-stamps `checkedInAt`.
pub async fn check_in(member_id: &str, store: &dyn BaseMemberStore) -> Result<Member, StoreError> {
    info!("checking in member {}", member_id);

    let patch = MemberPatch {
        checked_in: Some(true),
        checked_in_at: Some(ServerNow),
        ..MemberPatch::default()
    };
    store.update(&MemberKey::from_id(member_id), patch).await
}
