//! Request-scoped auth context.

/// Auth context derived from the verified session token.
///
/// This is the same for every route - it only tracks who is calling and
/// whether they hold the admin role. Domain results come from action
/// return values.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// The authenticated visitor's subject id, if any.
    pub subject_id: Option<String>,
    /// Whether the visitor has admin privileges.
    pub is_admin: bool,
}

impl AppState {
    /// Create state for an authenticated visitor.
    pub fn authenticated(subject_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            is_admin,
        }
    }

    /// Create state for an unauthenticated/anonymous request.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Check if the visitor is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.subject_id.is_some()
    }

    /// Check if the visitor is an admin.
    /// Returns false for unauthenticated visitors.
    pub fn is_admin(&self) -> bool {
        self.subject_id.is_some() && self.is_admin
    }
}
