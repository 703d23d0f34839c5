//! Firestore-backed member store.
//!
//! Maps `Member` records onto the deployment's existing document shape,
//! so the same collection can be read by older tooling. Server-assigned
//! timestamps (`ServerNow`) become `REQUEST_TIME` field transforms.

use std::collections::BTreeMap;

use async_trait::async_trait;
use firestore::{Document, FirestoreClient, FirestoreError, Value};
use tracing::debug;

use super::traits::{BaseMemberStore, StoreError};
use crate::domains::member::models::{Member, MemberKey, MemberPatch, NewMember, Role};

/// Firestore field names used by the members collection.
mod field {
    pub const UID: &str = "uid";
    pub const EMAIL: &str = "email";
    pub const NAME: &str = "name";
    pub const PHOTO_URL: &str = "photoURL";
    pub const ROLE: &str = "role";
    pub const CREATED_AT: &str = "createdAt";
    pub const LAST_LOGIN: &str = "lastLogin";
    pub const CHECKED_IN: &str = "checkedIn";
    pub const CHECKED_IN_AT: &str = "checkedInAt";
    pub const IS_PRE_REGISTERED: &str = "isPreRegistered";
    pub const UPDATED_AT: &str = "updatedAt";
}

pub struct FirestoreMemberStore {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreMemberStore {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    fn decode(doc: &Document) -> Member {
        let text = |name: &str| {
            doc.fields
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        let time = |name: &str| doc.fields.get(name).and_then(Value::as_timestamp);

        Member {
            id: doc.id().to_string(),
            uid: doc
                .fields
                .get(field::UID)
                .and_then(Value::as_str)
                .map(str::to_string),
            email: text(field::EMAIL),
            name: text(field::NAME),
            avatar_url: text(field::PHOTO_URL),
            role: doc
                .fields
                .get(field::ROLE)
                .and_then(Value::as_str)
                .map(Role::parse_lossy)
                .unwrap_or(Role::User),
            created_at: time(field::CREATED_AT),
            last_login_at: time(field::LAST_LOGIN),
            checked_in: doc
                .fields
                .get(field::CHECKED_IN)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            checked_in_at: time(field::CHECKED_IN_AT),
            is_pre_registered: doc
                .fields
                .get(field::IS_PRE_REGISTERED)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            updated_at: time(field::UPDATED_AT),
        }
    }

    /// Read a record back after a write so server-assigned timestamps are
    /// resolved before the caller sees the result.
    async fn read_back(&self, key: &MemberKey) -> Result<Member, StoreError> {
        self.get(key)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("record {} missing after write", key)))
    }
}

#[async_trait]
impl BaseMemberStore for FirestoreMemberStore {
    async fn get(&self, key: &MemberKey) -> Result<Option<Member>, StoreError> {
        let doc = self
            .client
            .get_document(&self.collection, key.as_str())
            .await
            .map_err(map_store_err)?;
        Ok(doc.as_ref().map(Self::decode))
    }

    async fn create(&self, key: &MemberKey, member: NewMember) -> Result<Member, StoreError> {
        let mut fields = BTreeMap::new();
        if let Some(uid) = &member.uid {
            fields.insert(field::UID.to_string(), Value::string(uid));
        }
        fields.insert(field::EMAIL.to_string(), Value::string(&member.email));
        fields.insert(field::NAME.to_string(), Value::string(&member.name));
        fields.insert(
            field::PHOTO_URL.to_string(),
            Value::string(&member.avatar_url),
        );
        fields.insert(
            field::ROLE.to_string(),
            Value::string(member.role.as_str()),
        );
        fields.insert(
            field::CHECKED_IN.to_string(),
            Value::boolean(member.checked_in),
        );
        fields.insert(field::CHECKED_IN_AT.to_string(), Value::null());
        if member.is_pre_registered {
            fields.insert(field::IS_PRE_REGISTERED.to_string(), Value::boolean(true));
        }

        let mut server_time = Vec::new();
        if member.created_at.is_some() {
            server_time.push(field::CREATED_AT);
        }
        if member.last_login_at.is_some() {
            server_time.push(field::LAST_LOGIN);
        }

        debug!(key = %key, collection = %self.collection, "writing member record");
        self.client
            .set_document(&self.collection, key.as_str(), fields, &server_time)
            .await
            .map_err(map_store_err)?;

        self.read_back(key).await
    }

    async fn update(&self, key: &MemberKey, patch: MemberPatch) -> Result<Member, StoreError> {
        let mut fields = BTreeMap::new();
        if let Some(name) = &patch.name {
            fields.insert(field::NAME.to_string(), Value::string(name));
        }
        if let Some(avatar_url) = &patch.avatar_url {
            fields.insert(field::PHOTO_URL.to_string(), Value::string(avatar_url));
        }
        if let Some(role) = patch.role {
            fields.insert(field::ROLE.to_string(), Value::string(role.as_str()));
        }
        if let Some(checked_in) = patch.checked_in {
            fields.insert(field::CHECKED_IN.to_string(), Value::boolean(checked_in));
        }

        let mut server_time = Vec::new();
        if patch.last_login_at.is_some() {
            server_time.push(field::LAST_LOGIN);
        }
        if patch.checked_in_at.is_some() {
            server_time.push(field::CHECKED_IN_AT);
        }
        if patch.updated_at.is_some() {
            server_time.push(field::UPDATED_AT);
        }

        debug!(key = %key, collection = %self.collection, "patching member record");
        self.client
            .update_document(&self.collection, key.as_str(), fields, &server_time)
            .await
            .map_err(map_store_err)?;

        self.read_back(key).await
    }

    async fn list_all(&self) -> Result<Vec<Member>, StoreError> {
        let docs = self
            .client
            .list_documents(&self.collection)
            .await
            .map_err(map_store_err)?;
        Ok(docs.iter().map(Self::decode).collect())
    }
}

fn map_store_err(e: FirestoreError) -> StoreError {
    match e {
        FirestoreError::NotFound(path) => StoreError::NotFound(path),
        other => StoreError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn doc(fields: Vec<(&str, Value)>) -> Document {
        Document {
            name: "projects/p/databases/(default)/documents/members/uid1".to_string(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_decode_full_record() {
        let checked_in_at = Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap();
        let document = doc(vec![
            (field::UID, Value::string("uid1")),
            (field::EMAIL, Value::string("a@x.com")),
            (field::NAME, Value::string("Ada")),
            (field::PHOTO_URL, Value::string("https://img.example/a.png")),
            (field::ROLE, Value::string("admin")),
            (field::CHECKED_IN, Value::boolean(true)),
            (field::CHECKED_IN_AT, Value::timestamp(checked_in_at)),
        ]);

        let member = FirestoreMemberStore::decode(&document);
        assert_eq!(member.id, "uid1");
        assert_eq!(member.uid.as_deref(), Some("uid1"));
        assert_eq!(member.email, "a@x.com");
        assert_eq!(member.role, Role::Admin);
        assert!(member.checked_in);
        assert_eq!(member.checked_in_at, Some(checked_in_at));
        assert!(!member.is_pre_registered);
    }

    #[test]
    fn test_decode_sparse_pre_registration_record() {
        let document = doc(vec![
            (field::EMAIL, Value::string("a@x.com")),
            (field::NAME, Value::string("Ada")),
            (field::ROLE, Value::string("admin")),
            (field::CHECKED_IN, Value::boolean(false)),
            (field::CHECKED_IN_AT, Value::null()),
            (field::IS_PRE_REGISTERED, Value::boolean(true)),
        ]);

        let member = FirestoreMemberStore::decode(&document);
        assert_eq!(member.uid, None);
        assert!(member.is_pre_registered);
        assert!(!member.checked_in);
        assert_eq!(member.checked_in_at, None);
        assert_eq!(member.avatar_url, "");
    }

    #[test]
    fn test_decode_defaults_on_missing_fields() {
        let member = FirestoreMemberStore::decode(&doc(vec![]));
        assert_eq!(member.role, Role::User);
        assert!(!member.checked_in);
        assert_eq!(member.email, "");
    }
}
