mod app;
mod bootstrap;
mod credentials;
mod error;
mod sink;
mod state;
mod token_store;

pub use app::RandomizerApp;
pub use bootstrap::{
    AuthorizationCallback, AuthorizationCodeSource, BungieSessionClient, SessionOrigin,
    authenticate, start_session,
};
pub use credentials::Credentials;
pub use error::AppError;
pub use sink::SnapshotEventSink;
pub use state::RandomizerSnapshot;
pub use token_store::{
    KEYRING_ACCOUNT, KEYRING_SERVICE, PreferenceTokenStore, RefreshTokenStore, TokenBackend,
};
