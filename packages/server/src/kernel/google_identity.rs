//! Google identity gateway.
//!
//! Verifies Google ID tokens (RS256) against the published key set and
//! maps the claims to an `IdentityProfile`. A sign-in that completed
//! out-of-band (redirect flow) is finished from a pending-credential
//! stash file written by the redirect landing page.

use std::path::PathBuf;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::traits::{BaseIdentityGateway, IdentityProfile};
use crate::domains::auth::errors::AuthError;

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

/// Claims carried by a Google ID token.
#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

pub struct GoogleIdentityGateway {
    client_id: String,
    http: Client,
    /// Cached signing keys, refetched when an unknown key id appears.
    keys: RwLock<Vec<Jwk>>,
    pending_credential_path: Option<PathBuf>,
}

impl GoogleIdentityGateway {
    pub fn new(client_id: String, pending_credential_path: Option<PathBuf>) -> Self {
        Self {
            client_id,
            http: Client::new(),
            keys: RwLock::new(Vec::new()),
            pending_credential_path,
        }
    }

    async fn key_for(&self, kid: &str) -> Result<Jwk, AuthError> {
        if let Some(key) = self.keys.read().await.iter().find(|k| k.kid == kid) {
            return Ok(key.clone());
        }

        debug!(kid, "unknown signing key id, refreshing key set");
        let jwks: Jwks = self
            .http
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let mut keys = self.keys.write().await;
        *keys = jwks.keys;
        keys.iter()
            .find(|k| k.kid == kid)
            .cloned()
            .ok_or_else(|| AuthError::InvalidCredential(format!("unknown signing key id {kid}")))
    }

    async fn verify_credential(&self, credential: &str) -> Result<IdentityProfile, AuthError> {
        let header =
            decode_header(credential).map_err(|e| AuthError::InvalidCredential(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidCredential("token has no key id".to_string()))?;

        let jwk = self.key_for(&kid).await?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(credential, &key, &validation)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;

        Ok(IdentityProfile {
            subject_id: data.claims.sub,
            email: data.claims.email,
            display_name: data.claims.name.unwrap_or_default(),
            avatar_url: data.claims.picture.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl BaseIdentityGateway for GoogleIdentityGateway {
    async fn sign_in(&self, credential: &str) -> Result<IdentityProfile, AuthError> {
        self.verify_credential(credential).await
    }

    async fn complete_redirect_sign_in(&self) -> Result<Option<IdentityProfile>, AuthError> {
        let Some(path) = &self.pending_credential_path else {
            return Ok(None);
        };

        let credential = match tokio::fs::read_to_string(path).await {
            Ok(credential) => credential,
            Err(_) => return Ok(None),
        };

        // Consume the stash before verifying so a bad credential is not
        // retried on every startup.
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("failed to remove pending credential stash: {}", e);
        }

        let credential = credential.trim();
        if credential.is_empty() {
            return Ok(None);
        }

        debug!("completing out-of-band sign-in from credential stash");
        self.verify_credential(credential).await.map(Some)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // ID tokens are verified per request; there is no provider-side
        // session to revoke from here.
        debug!("provider sign-out requested");
        Ok(())
    }
}
