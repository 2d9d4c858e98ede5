//! Bearer credentials for the reporting API.
//!
//! Session management lives with the identity provider; the client only
//! needs something that hands out a token and can be asked to renew it.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no API token configured")]
    MissingToken,
    #[error("session expired and cannot be renewed: {0}")]
    Expired(String),
}

pub trait CredentialProvider: Send + Sync {
    /// Token to send in the `Authorization` header.
    fn bearer(&self) -> Result<String, AuthError>;

    /// Renews the session after the API rejected the current token.
    fn refresh(&self) -> Result<(), AuthError>;
}

/// A fixed token taken from configuration.
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        StaticCredential {
            token: token.into(),
        }
    }
}

impl CredentialProvider for StaticCredential {
    fn bearer(&self) -> Result<String, AuthError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(token.to_owned())
    }

    fn refresh(&self) -> Result<(), AuthError> {
        Err(AuthError::Expired(
            "configured token was rejected; update ANALYTICS_API_TOKEN".to_owned(),
        ))
    }
}
