use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Member role stored on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse a stored role string. Anything unrecognized falls back to
    /// `User`, matching how records without a role are treated.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key for a member record.
///
/// Canonical records are keyed by the identity provider's subject id;
/// pre-registration records are keyed by a deterministic transform of the
/// email address until the person signs in for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey(String);

impl MemberKey {
    /// Key for the canonical record of an authenticated subject.
    pub fn for_subject(subject_id: &str) -> Self {
        Self(subject_id.to_string())
    }

    /// Email-derived key: `@` becomes `_at_`, every `.` becomes `_`.
    pub fn for_email(email: &str) -> Self {
        Self(email.replace('@', "_at_").replace('.', "_"))
    }

    /// Wrap an existing document id unchanged (subject id or email key).
    pub fn from_id(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The persisted member record - one document per known attendee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Document id: the subject id, or the email key for records that
    /// have never signed in.
    pub id: String,
    /// Provider subject id. Absent on pre-registration records.
    pub uid: Option<String>,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub is_pre_registered: bool,
    /// Stamped by the administrative role update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Marker for timestamp fields stamped by the backend at write time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerNow;

/// Full write for a new record (create or overwrite).
#[derive(Debug, Clone)]
pub struct NewMember {
    pub uid: Option<String>,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub role: Role,
    pub created_at: Option<ServerNow>,
    pub last_login_at: Option<ServerNow>,
    pub checked_in: bool,
    pub is_pre_registered: bool,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
    pub checked_in: Option<bool>,
    pub last_login_at: Option<ServerNow>,
    pub checked_in_at: Option<ServerNow>,
    pub updated_at: Option<ServerNow>,
}
