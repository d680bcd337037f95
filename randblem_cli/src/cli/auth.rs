use clap::{Args, Subcommand};
use randblem_app::{SessionOrigin, TokenBackend, authenticate};
use randblem_bungie::TokenStore;

use crate::cli::common::{CliContext, SessionArgs};

#[derive(Debug, Args)]
pub(crate) struct AuthCommand {
    #[command(subcommand)]
    subcmd: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
enum AuthSubcommand {
    /// Authorize the app and store a refresh token.
    Login(LoginCommand),

    /// Check that the stored refresh token still works.
    Status(StatusCommand),

    /// Remove the stored refresh token.
    Logout(LogoutCommand),
}

impl AuthCommand {
    pub(crate) async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        match &self.subcmd {
            AuthSubcommand::Login(cmd) => cmd.run(ctx).await,
            AuthSubcommand::Status(cmd) => cmd.run(ctx).await,
            AuthSubcommand::Logout(cmd) => cmd.run(ctx),
        }
    }
}

#[derive(Debug, Args)]
struct LoginCommand {
    #[command(flatten)]
    session: SessionArgs,

    /// Log in again even when a refresh token is stored.
    #[arg(long)]
    force: bool,
}

impl LoginCommand {
    async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let app = ctx.open_app()?;
        let mut auth = self.session.auth_service(&app)?;
        if self.force {
            auth.logout()?;
        }

        let mut code_source = self.session.code_source();
        match authenticate(&mut auth, &mut code_source).await? {
            SessionOrigin::Restored => {
                println!("A refresh token is already stored. Use --force to log in again.");
            }
            SessionOrigin::Exchanged => println!("Logged in; refresh token saved."),
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
struct StatusCommand {
    #[command(flatten)]
    session: SessionArgs,
}

impl StatusCommand {
    async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let app = ctx.open_app()?;
        let mut auth = self.session.auth_service(&app)?;

        if !auth.restore()? {
            println!("No refresh token stored. Run `randblem auth login`.");
            return Ok(());
        }

        match auth.refresh().await {
            Ok(_) => println!("Stored refresh token is valid; rotated token saved."),
            Err(err) => println!("Stored refresh token was rejected: {err}"),
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
struct LogoutCommand {
    /// Clear the OS keyring entry instead of the preferences file.
    #[arg(long)]
    keyring: bool,
}

impl LogoutCommand {
    fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let app = ctx.open_app()?;
        let backend = if self.keyring {
            TokenBackend::Keyring
        } else {
            TokenBackend::Preferences
        };

        app.token_store(backend).clear_refresh_token()?;
        println!("Cleared stored refresh token.");
        Ok(())
    }
}
