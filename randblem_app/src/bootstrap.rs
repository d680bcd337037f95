use async_trait::async_trait;
use randblem_bungie::{
    AuthService, BungieConfig, HttpBungieClient, LoginRequest, ManagedDestinyClient, TokenEndpoint,
    TokenStore,
};

use crate::AppError;

/// What the provider handed back on the redirect URL.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    pub code: String,
    pub state: Option<String>,
}

impl std::fmt::Debug for AuthorizationCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCallback")
            .field("code", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}

/// Obtains an authorization code once the user has approved the login.
#[async_trait]
pub trait AuthorizationCodeSource {
    async fn authorization_code(
        &mut self,
        login: &LoginRequest,
    ) -> Result<AuthorizationCallback, AppError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOrigin {
    /// A stored refresh token was found; no code exchange happened.
    Restored,
    /// The user authorized the app and the code was exchanged.
    Exchanged,
}

pub async fn authenticate<C, S, A>(
    auth: &mut AuthService<C, S>,
    code_source: &mut A,
) -> Result<SessionOrigin, AppError>
where
    C: TokenEndpoint + Send + Sync,
    S: TokenStore + Send + Sync,
    A: AuthorizationCodeSource + Send,
{
    if auth.restore()? {
        log::info!("using stored refresh token");
        return Ok(SessionOrigin::Restored);
    }

    log::info!("no stored refresh token; starting authorization code login");
    let login = auth.begin_login()?;
    let callback = code_source.authorization_code(&login).await?;
    auth.complete_login(&callback.code, callback.state.as_deref())
        .await?;
    Ok(SessionOrigin::Exchanged)
}

pub type BungieSessionClient<S> = ManagedDestinyClient<HttpBungieClient, HttpBungieClient, S>;

/// Builds the HTTP client, authenticates and returns a client ready for the
/// poller.
pub async fn start_session<S, A>(
    config: BungieConfig,
    store: S,
    code_source: &mut A,
) -> Result<(BungieSessionClient<S>, SessionOrigin), AppError>
where
    S: TokenStore + Send + Sync,
    A: AuthorizationCodeSource + Send,
{
    let http = HttpBungieClient::new(config)?;
    let mut auth = AuthService::new(http.clone(), store);
    let origin = authenticate(&mut auth, code_source).await?;
    Ok((ManagedDestinyClient::new(http, auth), origin))
}
