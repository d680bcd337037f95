use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};

use crate::cli::{
    auth::AuthCommand, common::CliContext, prefs::PrefsCommand, profile::ProfileCommand,
    run::RunCommand,
};

pub(crate) fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Debug, Parser)]
#[command(version = clap::crate_version!(), about = "Equips a random Destiny 2 emblem every time you land in orbit.")]
pub(crate) struct CliOpts {
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Preferences file holding credentials and the refresh token.
    #[arg(long, global = true, env = "RANDBLEM_PREFERENCES")]
    preferences: Option<PathBuf>,

    #[command(subcommand)]
    subcmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll until Ctrl+C, equipping a random emblem on each orbit entry.
    Run(RunCommand),

    /// Login and stored session operations.
    Auth(AuthCommand),

    /// Print the current profile as the poller sees it.
    Profile(ProfileCommand),

    /// Inspect or edit the preferences file.
    Prefs(PrefsCommand),
}

impl CliOpts {
    pub(crate) fn verbose(&self) -> u8 {
        self.verbose
    }

    pub(crate) fn preferences(&self) -> Option<&Path> {
        self.preferences.as_deref()
    }

    pub(crate) fn name(&self) -> &'static str {
        match &self.subcmd {
            Command::Run(_) => "run",
            Command::Auth(_) => "auth",
            Command::Profile(_) => "profile",
            Command::Prefs(_) => "prefs",
        }
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let ctx = CliContext {
            preferences: self.preferences.clone(),
        };
        match &self.subcmd {
            Command::Run(cmd) => cmd.run(&ctx).await,
            Command::Auth(cmd) => cmd.run(&ctx).await,
            Command::Profile(cmd) => cmd.run(&ctx).await,
            Command::Prefs(cmd) => cmd.run(&ctx),
        }
    }
}
