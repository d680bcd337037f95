use std::fmt;

use crate::client::TokenGrant;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRequest {
    pub authorization_url: String,
    pub state: String,
}

/// Tokens for the current process. Expiry is not tracked: a 401 from the
/// provider is the signal to refresh.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub(crate) fn with_refresh_token(refresh_token: String) -> Self {
        Self {
            access_token: None,
            refresh_token: Some(refresh_token),
        }
    }

    /// Both tokens are replaced since the provider rotates refresh tokens.
    pub(crate) fn apply(&mut self, grant: TokenGrant) {
        self.access_token = Some(grant.access_token);
        self.refresh_token = Some(grant.refresh_token);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}
