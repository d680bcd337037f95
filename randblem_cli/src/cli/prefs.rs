use clap::{Args, Subcommand};
use randblem_store::{API_KEY, CLIENT_SECRET, REFRESH_TOKEN};

use crate::cli::common::CliContext;

const SECRET_KEYS: [&str; 3] = [API_KEY, CLIENT_SECRET, REFRESH_TOKEN];

#[derive(Debug, Args)]
pub(crate) struct PrefsCommand {
    #[command(subcommand)]
    subcmd: PrefsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PrefsSubcommand {
    /// Print the preferences file location.
    Path,

    /// Print stored preferences with secrets masked.
    Show,

    /// Store one preference.
    Set(SetCommand),
}

#[derive(Debug, Args)]
struct SetCommand {
    key: String,
    value: String,
}

impl PrefsCommand {
    pub(crate) fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let app = ctx.open_app()?;
        let preferences = app.preferences();

        match &self.subcmd {
            PrefsSubcommand::Path => println!("{}", preferences.path().display()),
            PrefsSubcommand::Show => {
                for (key, value) in preferences.get_all()? {
                    println!("{key} = {}", display_value(&key, &value));
                }
                let missing = preferences.missing_required()?;
                if !missing.is_empty() {
                    println!("\nmissing: {}", missing.join(", "));
                }
            }
            PrefsSubcommand::Set(cmd) => {
                preferences.set(cmd.key.trim(), cmd.value.trim())?;
                println!("Saved `{}` to {}", cmd.key.trim(), preferences.path().display());
            }
        }
        Ok(())
    }
}

fn display_value(key: &str, value: &str) -> String {
    if value.is_empty() {
        "<unset>".to_owned()
    } else if SECRET_KEYS.contains(&key) {
        "<redacted>".to_owned()
    } else {
        value.to_owned()
    }
}
