mod api;
pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod destiny_client;
pub mod errors;
pub mod poller;
pub mod token_store;

pub use api::identity_from_memberships;
pub use auth::{AuthService, LoginRequest, Session, with_reauth};
pub use client::{DestinyApi, EquipRequest, HttpBungieClient, TokenEndpoint, TokenGrant};
pub use clock::{Clock, SystemClock};
pub use config::BungieConfig;
pub use destiny_client::{DestinyClient, ManagedDestinyClient};
pub use errors::{BungieError, BungieResult};
pub use poller::{EmblemPoller, PollConfig, PollMetrics, PollOutcome};
pub use token_store::{KeyringTokenStore, MemoryTokenStore, TokenStore};
