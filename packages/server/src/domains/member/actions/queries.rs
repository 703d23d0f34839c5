//! Member query actions
//!
//! Query actions return data directly; auth checks are done at the
//! surface layer.

use tracing::debug;

use crate::domains::member::models::Member;
use crate::kernel::{BaseMemberStore, StoreError};

/// Load the full member roster. The backend returns the complete set per
/// call; there is no pagination cursor.
pub async fn list_members(store: &dyn BaseMemberStore) -> Result<Vec<Member>, StoreError> {
    let members = store.list_all().await?;
    debug!("loaded {} member records", members.len());
    Ok(members)
}
