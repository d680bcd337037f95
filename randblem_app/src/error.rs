use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("preferences error: {0}")]
    Store(#[from] randblem_store::StoreError),

    #[error("bungie error: {0}")]
    Bungie(#[from] randblem_bungie::BungieError),

    #[error(
        "missing required preferences {} in {}; set them with `randblem prefs set <key> <value>` or edit the file",
        missing.join(", "),
        path.display()
    )]
    MissingCredentials {
        missing: Vec<&'static str>,
        path: PathBuf,
    },

    #[error("authorization code was not received: {0}")]
    AuthorizationCode(String),

    #[error("status snapshot lock was poisoned")]
    StatePoisoned,
}
