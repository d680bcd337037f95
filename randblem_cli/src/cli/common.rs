use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Args;
use randblem_app::{
    BungieSessionClient, RandomizerApp, RefreshTokenStore, SessionOrigin, TokenBackend,
    start_session,
};
use randblem_bungie::{AuthService, HttpBungieClient};

use crate::cli::callback::CliCodeSource;

#[derive(Debug)]
pub(crate) struct CliContext {
    pub(crate) preferences: Option<PathBuf>,
}

impl CliContext {
    pub(crate) fn open_app(&self) -> anyhow::Result<RandomizerApp> {
        RandomizerApp::open(self.preferences.clone()).context("failed to open preferences")
    }
}

/// Options shared by every command that talks to Bungie.
#[derive(Debug, Args)]
pub(crate) struct SessionArgs {
    /// Keep the refresh token in the OS keyring instead of the preferences file.
    #[arg(long)]
    keyring: bool,

    /// Redirect URL registered for the application. An `http://` URL is served
    /// locally to capture the code; otherwise the redirected URL is pasted.
    #[arg(long, env = "RANDBLEM_REDIRECT_URL")]
    redirect_url: Option<String>,

    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

impl SessionArgs {
    pub(crate) fn backend(&self) -> TokenBackend {
        if self.keyring {
            TokenBackend::Keyring
        } else {
            TokenBackend::Preferences
        }
    }

    pub(crate) fn code_source(&self) -> CliCodeSource {
        CliCodeSource::new(self.redirect_url.clone())
    }

    pub(crate) fn auth_service(
        &self,
        app: &RandomizerApp,
    ) -> anyhow::Result<AuthService<HttpBungieClient, RefreshTokenStore>> {
        let config = app
            .bungie_config()?
            .with_request_timeout(self.request_timeout());
        let client = HttpBungieClient::new(config).context("failed to build bungie client")?;
        Ok(AuthService::new(client, app.token_store(self.backend())))
    }

    pub(crate) async fn connect(
        &self,
        app: &RandomizerApp,
    ) -> anyhow::Result<(BungieSessionClient<RefreshTokenStore>, SessionOrigin)> {
        let config = app
            .bungie_config()?
            .with_request_timeout(self.request_timeout());
        let mut code_source = self.code_source();
        let connected = start_session(config, app.token_store(self.backend()), &mut code_source)
            .await
            .context("failed to start bungie session")?;
        Ok(connected)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
