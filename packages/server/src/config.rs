use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub firestore_project_id: String,
    pub firestore_api_key: Option<String>,
    pub firestore_auth_token: Option<String>,
    pub members_collection: String,
    pub google_client_id: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub port: u16,
    /// Stash file holding a credential from a sign-in that completed
    /// out-of-band (redirect flow). Consumed once at startup.
    pub pending_credential_path: Option<PathBuf>,
    /// Admins to pre-register before their first sign-in.
    pub admin_seed: Vec<AdminSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            firestore_project_id: env::var("FIRESTORE_PROJECT_ID")
                .context("FIRESTORE_PROJECT_ID must be set")?,
            firestore_api_key: env::var("FIRESTORE_API_KEY").ok(),
            firestore_auth_token: env::var("FIRESTORE_AUTH_TOKEN").ok(),
            members_collection: env::var("MEMBERS_COLLECTION")
                .unwrap_or_else(|_| "members".to_string()),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .context("GOOGLE_CLIENT_ID must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "doorlist".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            pending_credential_path: env::var("PENDING_CREDENTIAL_PATH").ok().map(PathBuf::from),
            admin_seed: parse_admin_seed(&env::var("ADMIN_SEED").unwrap_or_default()),
        })
    }
}

/// Parse the `ADMIN_SEED` variable: comma-separated entries of
/// `email:Display Name`; the name is optional.
fn parse_admin_seed(raw: &str) -> Vec<AdminSeed> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (email, name) = match entry.split_once(':') {
                Some((email, name)) => (email.trim(), name.trim()),
                None => (entry, ""),
            };
            Some(AdminSeed {
                email: email.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_seed() {
        let seed = parse_admin_seed("a@x.com:Andrew Carlson, b@x.com:Savannah Carlson");
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].email, "a@x.com");
        assert_eq!(seed[0].name, "Andrew Carlson");
        assert_eq!(seed[1].email, "b@x.com");
    }

    #[test]
    fn test_parse_admin_seed_without_names() {
        let seed = parse_admin_seed("a@x.com,b@x.com");
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].name, "");
    }

    #[test]
    fn test_parse_admin_seed_empty() {
        assert!(parse_admin_seed("").is_empty());
        assert!(parse_admin_seed(" , ").is_empty());
    }
}
