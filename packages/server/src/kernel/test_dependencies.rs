// Mock implementations of the external collaborators for testing.
//
// Used by unit tests and the integration tests under tests/.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::traits::{BaseIdentityGateway, BaseMemberStore, IdentityProfile, StoreError};
use crate::domains::auth::errors::AuthError;
use crate::domains::member::models::{Member, MemberKey, MemberPatch, NewMember};

// =============================================================================
// In-memory Member Store
// =============================================================================

/// In-memory member store keyed by document id.
///
/// Iteration order is key order, mirroring how the backend lists
/// documents by name. `ServerNow` sentinels are stamped with `Utc::now()`.
#[derive(Default)]
pub struct MemoryMemberStore {
    docs: Mutex<BTreeMap<String, Member>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, keyed by its id.
    pub fn with_member(self, member: Member) -> Self {
        self.insert(member);
        self
    }

    pub fn insert(&self, member: Member) {
        let mut docs = self.docs.lock().unwrap();
        docs.insert(member.id.clone(), member);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct snapshot of a stored record, bypassing failure scripting.
    pub fn snapshot(&self, id: &str) -> Option<Member> {
        self.docs.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl BaseMemberStore for MemoryMemberStore {
    async fn get(&self, key: &MemberKey) -> Result<Option<Member>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted read failure".to_string()));
        }
        Ok(self.docs.lock().unwrap().get(key.as_str()).cloned())
    }

    async fn create(&self, key: &MemberKey, member: NewMember) -> Result<Member, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted write failure".to_string()));
        }

        let now = Utc::now();
        let record = Member {
            id: key.as_str().to_string(),
            uid: member.uid,
            email: member.email,
            name: member.name,
            avatar_url: member.avatar_url,
            role: member.role,
            created_at: member.created_at.map(|_| now),
            last_login_at: member.last_login_at.map(|_| now),
            checked_in: member.checked_in,
            checked_in_at: None,
            is_pre_registered: member.is_pre_registered,
            updated_at: None,
        };

        let mut docs = self.docs.lock().unwrap();
        docs.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, key: &MemberKey, patch: MemberPatch) -> Result<Member, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted write failure".to_string()));
        }

        let now = Utc::now();
        let mut docs = self.docs.lock().unwrap();
        let record = docs
            .get_mut(key.as_str())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(avatar_url) = patch.avatar_url {
            record.avatar_url = avatar_url;
        }
        if let Some(role) = patch.role {
            record.role = role;
        }
        if let Some(checked_in) = patch.checked_in {
            record.checked_in = checked_in;
        }
        if patch.last_login_at.is_some() {
            record.last_login_at = Some(now);
        }
        if patch.checked_in_at.is_some() {
            record.checked_in_at = Some(now);
        }
        if patch.updated_at.is_some() {
            record.updated_at = Some(now);
        }

        Ok(record.clone())
    }

    async fn list_all(&self) -> Result<Vec<Member>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted read failure".to_string()));
        }
        Ok(self.docs.lock().unwrap().values().cloned().collect())
    }
}

// =============================================================================
// Mock Identity Gateway
// =============================================================================

/// Scripted identity gateway.
///
/// `sign_in` pops scripted results in order; with nothing scripted it
/// fails with `InvalidCredential`. Calls are recorded for assertions.
#[derive(Default)]
pub struct MockIdentityGateway {
    sign_in_results: Mutex<Vec<Result<IdentityProfile, AuthError>>>,
    pending: Mutex<Option<IdentityProfile>>,
    sign_in_calls: Mutex<Vec<String>>,
    sign_out_calls: AtomicUsize,
    fail_sign_out: AtomicBool,
    /// Delay before each sign_in response, to hold the session in
    /// `Authenticating` in re-entrancy tests.
    sign_in_delay: Mutex<Option<Duration>>,
}

impl MockIdentityGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful sign-in yielding `profile`.
    pub fn with_profile(self, profile: IdentityProfile) -> Self {
        self.sign_in_results.lock().unwrap().push(Ok(profile));
        self
    }

    /// Script a failed sign-in.
    pub fn with_failure(self, error: AuthError) -> Self {
        self.sign_in_results.lock().unwrap().push(Err(error));
        self
    }

    /// Script a pending out-of-band completion.
    pub fn with_pending(self, profile: IdentityProfile) -> Self {
        *self.pending.lock().unwrap() = Some(profile);
        self
    }

    pub fn with_sign_in_delay(self, delay: Duration) -> Self {
        *self.sign_in_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn failing_sign_out(self) -> Self {
        self.fail_sign_out.store(true, Ordering::SeqCst);
        self
    }

    /// Credentials passed to sign_in, in call order.
    pub fn sign_in_calls(&self) -> Vec<String> {
        self.sign_in_calls.lock().unwrap().clone()
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseIdentityGateway for MockIdentityGateway {
    async fn sign_in(&self, credential: &str) -> Result<IdentityProfile, AuthError> {
        self.sign_in_calls
            .lock()
            .unwrap()
            .push(credential.to_string());

        let delay = *self.sign_in_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut results = self.sign_in_results.lock().unwrap();
        if results.is_empty() {
            Err(AuthError::InvalidCredential(
                "no scripted sign-in response".to_string(),
            ))
        } else {
            results.remove(0)
        }
    }

    async fn complete_redirect_sign_in(&self) -> Result<Option<IdentityProfile>, AuthError> {
        Ok(self.pending.lock().unwrap().take())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            Err(AuthError::Network("scripted sign-out failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Convenience profile for tests.
pub fn test_profile(subject_id: &str, email: &str, display_name: &str) -> IdentityProfile {
    IdentityProfile {
        subject_id: subject_id.to_string(),
        email: email.to_string(),
        display_name: display_name.to_string(),
        avatar_url: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::member::models::{Role, ServerNow};

    fn new_member(email: &str) -> NewMember {
        NewMember {
            uid: Some("uid1".to_string()),
            email: email.to_string(),
            name: String::new(),
            avatar_url: String::new(),
            role: Role::User,
            created_at: Some(ServerNow),
            last_login_at: Some(ServerNow),
            checked_in: false,
            is_pre_registered: false,
        }
    }

    #[test]
    fn test_memory_store_create_and_get() {
        tokio_test::block_on(async {
            let store = MemoryMemberStore::new();
            let key = MemberKey::for_subject("uid1");

            store.create(&key, new_member("a@x.com")).await.unwrap();
            let fetched = store.get(&key).await.unwrap().unwrap();

            assert_eq!(fetched.id, "uid1");
            assert_eq!(fetched.email, "a@x.com");
            assert!(fetched.created_at.is_some());
        });
    }

    #[test]
    fn test_memory_store_update_missing_is_not_found() {
        tokio_test::block_on(async {
            let store = MemoryMemberStore::new();
            let result = store
                .update(&MemberKey::for_subject("ghost"), MemberPatch::default())
                .await;
            assert!(matches!(result, Err(StoreError::NotFound(_))));
        });
    }

    #[test]
    fn test_mock_gateway_scripts_results_in_order() {
        tokio_test::block_on(async {
            let gateway = MockIdentityGateway::new()
                .with_profile(test_profile("uid1", "a@x.com", "Ada"))
                .with_failure(AuthError::Cancelled);

            assert!(gateway.sign_in("first").await.is_ok());
            assert!(matches!(
                gateway.sign_in("second").await,
                Err(AuthError::Cancelled)
            ));
            // exhausted script fails closed
            assert!(gateway.sign_in("third").await.is_err());
            assert_eq!(gateway.sign_in_calls().len(), 3);
        });
    }
}
