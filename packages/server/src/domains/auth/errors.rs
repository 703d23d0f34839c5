use thiserror::Error;

use crate::kernel::StoreError;

/// Identity-gateway and session errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("sign-in was cancelled")]
    Cancelled,

    #[error("a sign-in attempt is already in progress")]
    SignInInProgress,

    #[error("invalid identity credential: {0}")]
    InvalidCredential(String),

    #[error("identity provider unreachable: {0}")]
    Network(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
