use async_trait::async_trait;

/// Caller identity resolved from a session token by the auth collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub roles: Vec<String>,
    pub residence_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid session")]
    InvalidSession,
}

/// Contract of the auth/session collaborator. The engine never verifies
/// tokens itself.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Session, SessionError>;
}
