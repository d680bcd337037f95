use std::fmt;

use randblem_core::ids::CharacterId;
use thiserror::Error;

pub type BungieResult<T> = Result<T, BungieError>;

#[derive(Debug, Error)]
pub enum BungieError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("missing required credentials: {}", keys.join(", "))]
    MissingCredentials { keys: Vec<&'static str> },
    #[error("invalid url")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{operation} was rejected with status {status}: {body}")]
    AuthRejected {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{operation} response is missing `{field}`")]
    AuthMissingField {
        operation: &'static str,
        field: &'static str,
    },
    #[error("{operation} request could not be sent")]
    AuthTransport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("login was not started before code exchange")]
    LoginNotStarted,
    #[error("state mismatch: expected {expected}, got {got}")]
    StateMismatch { expected: String, got: String },
    #[error("not authenticated: {reason}")]
    NotAuthenticated { reason: String },
    #[error("{operation} returned 401 unauthorized")]
    Unauthorized { operation: &'static str },
    #[error("{operation} failed with status {status}: {body}")]
    Upstream {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{operation} request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed {operation} response: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },
    #[error("no emblems found for character {character_id}")]
    NoEmblemsFound { character_id: CharacterId },
    #[error("equip failed with status {status}: {body}")]
    Equip { status: u16, body: String },
    #[error("keyring operation failed")]
    Keyring(#[from] keyring::Error),
    #[error("token store operation failed: {0}")]
    TokenStore(Box<dyn std::error::Error + Send + Sync>),
    #[error("{0}")]
    Message(String),
}

impl BungieError {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    pub fn token_store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::TokenStore(Box::new(err))
    }

    pub fn malformed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            detail: detail.into(),
        }
    }

    /// Token exchange or refresh failed.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::AuthRejected { .. } | Self::AuthMissingField { .. } | Self::AuthTransport { .. }
        )
    }

    pub fn display_chain(&self) -> DisplayChainedError<'_> {
        DisplayChainedError { inner: self }
    }
}

pub struct DisplayChainedError<'a> {
    inner: &'a (dyn std::error::Error + 'static),
}

impl fmt::Debug for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self.inner);
        let mut separator = "";

        while let Some(err) = current {
            write!(f, "{separator}{err}")?;
            separator = " -> ";
            current = err.source();
        }

        Ok(())
    }
}

impl fmt::Display for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
