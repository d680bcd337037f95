use rand::{Rng, distributions::Alphanumeric};

use super::types::{LoginRequest, Session};
use crate::{BungieError, BungieResult, client::TokenEndpoint, token_store::TokenStore};

const STATE_LEN: usize = 32;

pub struct AuthService<C, S>
where
    C: TokenEndpoint,
    S: TokenStore,
{
    client: C,
    store: S,
    session: Session,
    pending_state: Option<String>,
}

impl<C, S> AuthService<C, S>
where
    C: TokenEndpoint,
    S: TokenStore,
{
    pub fn new(client: C, store: S) -> Self {
        Self {
            client,
            store,
            session: Session::default(),
            pending_state: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.access_token()
    }

    /// Loads the durable refresh token into the session. Returns whether one
    /// was found.
    pub fn restore(&mut self) -> BungieResult<bool> {
        match self.store.load_refresh_token()? {
            Some(refresh_token) if !refresh_token.trim().is_empty() => {
                self.session = Session::with_refresh_token(refresh_token);
                log::debug!("restored stored refresh token");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn begin_login(&mut self) -> BungieResult<LoginRequest> {
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_LEN)
            .map(char::from)
            .collect();
        let authorization_url = self.client.authorization_url(&state)?;

        self.pending_state = Some(state.clone());
        Ok(LoginRequest {
            authorization_url,
            state,
        })
    }

    /// Finishes a login started with [`AuthService::begin_login`]. The provider
    /// may drop `state` from the redirect, so only a present-but-different
    /// state is rejected.
    pub async fn complete_login(
        &mut self,
        code: &str,
        callback_state: Option<&str>,
    ) -> BungieResult<Session> {
        let expected = self.pending_state.take().ok_or(BungieError::LoginNotStarted)?;
        if let Some(got) = callback_state {
            if got != expected {
                return Err(BungieError::StateMismatch {
                    expected,
                    got: got.to_owned(),
                });
            }
        }

        self.exchange_code(code).await
    }

    pub async fn exchange_code(&mut self, code: &str) -> BungieResult<Session> {
        let grant = self.client.exchange_code(code).await?;
        self.session.apply(grant);
        self.persist_refresh_token()?;
        log::info!("authorization code exchanged for a new session");
        Ok(self.session.clone())
    }

    pub async fn refresh(&mut self) -> BungieResult<Session> {
        let refresh_token = self
            .session
            .refresh_token()
            .map(str::to_owned)
            .ok_or_else(|| BungieError::NotAuthenticated {
                reason: "no refresh token available; log in first".to_owned(),
            })?;

        let grant = match self.client.refresh(&refresh_token).await {
            Ok(grant) => grant,
            Err(err) => {
                log::warn!("access token refresh failed: {:?}", err.display_chain());
                return Err(err);
            }
        };
        self.session.apply(grant);
        self.persist_refresh_token()?;
        log::debug!("access token refreshed");
        Ok(self.session.clone())
    }

    pub fn logout(&mut self) -> BungieResult<()> {
        self.session = Session::default();
        self.pending_state = None;
        self.store.clear_refresh_token()
    }

    fn persist_refresh_token(&self) -> BungieResult<()> {
        match self.session.refresh_token() {
            Some(refresh_token) => self.store.save_refresh_token(refresh_token),
            None => Ok(()),
        }
    }
}
